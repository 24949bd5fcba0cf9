//! Windows-specific install root discovery through the registry

use super::types::CompilerFamily;
use std::path::PathBuf;

/// Registry keys whose default value is an install root
const LLVM_KEYS: &[&str] = &[r"SOFTWARE\LLVM\LLVM", r"SOFTWARE\WOW6432Node\LLVM\LLVM"];

/// Install roots of `family` recorded in `HKEY_LOCAL_MACHINE`
pub fn registry_roots(family: CompilerFamily) -> Vec<PathBuf> {
    match family {
        CompilerFamily::Clang | CompilerFamily::ClangCL => llvm_roots(),
        _ => Vec::new(),
    }
}

fn llvm_roots() -> Vec<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::*;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    LLVM_KEYS
        .iter()
        .filter_map(|key| {
            let subkey = hklm.open_subkey(key).ok()?;
            let path: String = subkey.get_value("").ok()?;
            Some(PathBuf::from(path))
        })
        .collect()
}
