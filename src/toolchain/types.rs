use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::SettingsError;

/// Supported toolchain families.
///
/// Families differ only in data (tool names, switches, layout); nothing
/// dispatches on them beyond the lookup tables below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum CompilerFamily {
    /// GNU Compiler Collection (gcc / g++), including MinGW
    GCC,
    /// Clang/LLVM (clang / clang++)
    Clang,
    /// Microsoft Visual C++ (cl.exe)
    MSVC,
    /// Clang with MSVC compatibility (clang-cl.exe)
    ClangCL,
}

/// Command-line switches a family uses for search paths and libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switches {
    pub include_dir: &'static str,
    pub lib_dir: &'static str,
    pub link_lib_prefix: &'static str,
    pub link_lib_suffix: &'static str,
}

const GNU_SWITCHES: Switches = Switches {
    include_dir: "-I",
    lib_dir: "-L",
    link_lib_prefix: "-l",
    link_lib_suffix: "",
};

const MSVC_SWITCHES: Switches = Switches {
    include_dir: "/I",
    lib_dir: "/LIBPATH:",
    link_lib_prefix: "",
    link_lib_suffix: ".lib",
};

impl CompilerFamily {
    pub const ALL: [CompilerFamily; 4] = [
        CompilerFamily::GCC,
        CompilerFamily::Clang,
        CompilerFamily::MSVC,
        CompilerFamily::ClangCL,
    ];

    /// Short key used in ids and in the settings file.
    pub fn key(&self) -> &'static str {
        match self {
            CompilerFamily::GCC => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::MSVC => "msvc",
            CompilerFamily::ClangCL => "clang-cl",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "gcc" | "g++" | "mingw" => Some(CompilerFamily::GCC),
            "clang" | "clang++" => Some(CompilerFamily::Clang),
            "msvc" | "cl" | "cl.exe" => Some(CompilerFamily::MSVC),
            "clang-cl" | "clangcl" => Some(CompilerFamily::ClangCL),
            _ => None,
        }
    }

    pub fn uses_msvc_flags(&self) -> bool {
        matches!(self, CompilerFamily::MSVC | CompilerFamily::ClangCL)
    }

    pub fn switches(&self) -> Switches {
        if self.uses_msvc_flags() {
            MSVC_SWITCHES
        } else {
            GNU_SWITCHES
        }
    }

    /// Directory below the master path that holds the executables.
    pub fn bin_dir(&self) -> &'static str {
        match self {
            CompilerFamily::MSVC => "bin/Hostx64/x64",
            _ => "bin",
        }
    }

    /// Default executable names for this family on the current host.
    pub fn default_tools(&self) -> ToolNames {
        let exe = |name: &str| {
            if cfg!(windows) {
                format!("{}.exe", name)
            } else {
                name.to_string()
            }
        };
        match self {
            CompilerFamily::GCC => ToolNames {
                c_compiler: exe("gcc"),
                cpp_compiler: exe("g++"),
                linker: exe("g++"),
                archiver: exe("ar"),
                debugger: exe("gdb"),
            },
            CompilerFamily::Clang => ToolNames {
                c_compiler: exe("clang"),
                cpp_compiler: exe("clang++"),
                linker: exe("clang++"),
                archiver: exe("llvm-ar"),
                debugger: exe("lldb"),
            },
            CompilerFamily::MSVC => ToolNames {
                c_compiler: "cl.exe".to_string(),
                cpp_compiler: "cl.exe".to_string(),
                linker: "link.exe".to_string(),
                archiver: "lib.exe".to_string(),
                debugger: "cdb.exe".to_string(),
            },
            CompilerFamily::ClangCL => ToolNames {
                c_compiler: "clang-cl.exe".to_string(),
                cpp_compiler: "clang-cl.exe".to_string(),
                linker: "lld-link.exe".to_string(),
                archiver: "llvm-lib.exe".to_string(),
                debugger: "lldb.exe".to_string(),
            },
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Stable identity of a compiler descriptor.
///
/// Unlike the positional index, the id survives removals and restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerId(String);

impl CompilerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompilerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CompilerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Executable names of the tools making up a toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolNames {
    pub c_compiler: String,
    pub cpp_compiler: String,
    pub linker: String,
    pub archiver: String,
    pub debugger: String,
}

/// Which tool of a toolchain to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CCompiler,
    CppCompiler,
    Linker,
    Archiver,
    Debugger,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::CCompiler,
        Tool::CppCompiler,
        Tool::Linker,
        Tool::Archiver,
        Tool::Debugger,
    ];

    /// Settings key of this tool.
    pub fn key(&self) -> &'static str {
        match self {
            Tool::CCompiler => "c_compiler",
            Tool::CppCompiler => "cpp_compiler",
            Tool::Linker => "linker",
            Tool::Archiver => "archiver",
            Tool::Debugger => "debugger",
        }
    }
}

impl ToolNames {
    pub fn get(&self, tool: Tool) -> &str {
        match tool {
            Tool::CCompiler => &self.c_compiler,
            Tool::CppCompiler => &self.cpp_compiler,
            Tool::Linker => &self.linker,
            Tool::Archiver => &self.archiver,
            Tool::Debugger => &self.debugger,
        }
    }

    pub fn set(&mut self, tool: Tool, name: impl Into<String>) {
        let slot = match tool {
            Tool::CCompiler => &mut self.c_compiler,
            Tool::CppCompiler => &mut self.cpp_compiler,
            Tool::Linker => &mut self.linker,
            Tool::Archiver => &mut self.archiver,
            Tool::Debugger => &mut self.debugger,
        };
        *slot = name.into();
    }
}

/// Error type for registry operations
#[derive(Debug)]
pub enum CompilerError {
    /// No compiler with this id is registered
    NotFound(CompilerId),
    /// Built-in compilers are registered on every start and cannot be removed
    BuiltIn(CompilerId),
    /// Reading or writing persisted settings failed
    Settings(SettingsError),
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerError::NotFound(id) => write!(f, "Compiler not found: {}", id),
            CompilerError::BuiltIn(id) => {
                write!(f, "Compiler '{}' is built in and cannot be removed", id)
            }
            CompilerError::Settings(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for CompilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompilerError::Settings(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SettingsError> for CompilerError {
    fn from(e: SettingsError) -> Self {
        CompilerError::Settings(e)
    }
}
