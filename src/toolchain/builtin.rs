//! Built-in compiler descriptors registered at startup.

use super::descriptor::CompilerDescriptor;
use super::types::CompilerFamily;

/// Display name of the built-in descriptor for `family`.
pub fn builtin_name(family: CompilerFamily) -> &'static str {
    match family {
        CompilerFamily::GCC => "GNU GCC Compiler",
        CompilerFamily::Clang => "LLVM Clang Compiler",
        CompilerFamily::MSVC => "Microsoft Visual C++",
        CompilerFamily::ClangCL => "LLVM Clang-CL (MSVC compatible)",
    }
}

/// Families that make sense on the current host.
pub fn host_families() -> Vec<CompilerFamily> {
    if cfg!(windows) {
        CompilerFamily::ALL.to_vec()
    } else {
        vec![CompilerFamily::GCC, CompilerFamily::Clang]
    }
}

/// A root descriptor for `family` with an unresolved master path.
pub fn builtin_descriptor(family: CompilerFamily) -> CompilerDescriptor {
    CompilerDescriptor::new(family.key(), builtin_name(family), family)
}

/// Whether `compiler` is one of the descriptors [`builtin_descriptors`]
/// registers. Those come back on every start, so they cannot be removed.
pub fn is_builtin(compiler: &CompilerDescriptor) -> bool {
    compiler.parent().is_none()
        && host_families()
            .into_iter()
            .any(|family| family == compiler.family() && compiler.id().as_str() == family.key())
}

/// The built-in set, in registration order.
pub fn builtin_descriptors() -> Vec<CompilerDescriptor> {
    host_families().into_iter().map(builtin_descriptor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_roots_without_master_path() {
        let builtins = builtin_descriptors();
        assert!(builtins.len() >= 2);
        for d in &builtins {
            assert!(d.parent().is_none());
            assert!(!d.has_master_path());
            assert_eq!(d.id().as_str(), d.family().key());
        }
    }

    #[test]
    fn test_is_builtin_only_for_registered_roots() {
        let gcc = builtin_descriptor(CompilerFamily::GCC);
        assert!(is_builtin(&gcc));
        assert!(!is_builtin(&gcc.create_copy("gcc-copy".into())));
        assert!(!is_builtin(&CompilerDescriptor::new(
            "gcc-2",
            "Detected",
            CompilerFamily::GCC
        )));
    }

    #[test]
    fn test_gcc_is_registered_first() {
        assert_eq!(builtin_descriptors()[0].family(), CompilerFamily::GCC);
    }
}
