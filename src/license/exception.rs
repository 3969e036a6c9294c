use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Known exception spellings and their canonical SPDX exception identifier.
static EXCEPTION_LABELS: &[(&str, &str)] = &[
    ("CE", "Classpath-exception-2.0"),
    ("CPE", "Classpath-exception-2.0"),
    ("Classpath", "Classpath-exception-2.0"),
    ("Classpath Exception", "Classpath-exception-2.0"),
    ("Classpath exception", "Classpath-exception-2.0"),
    ("Classpath exception 2.0", "Classpath-exception-2.0"),
    ("Classpath-exception-2.0", "Classpath-exception-2.0"),
    ("GCC Runtime Library Exception", "GCC-exception-3.1"),
    ("GCC Runtime Library exception 3.1", "GCC-exception-3.1"),
    ("GCC exception 3.1", "GCC-exception-3.1"),
    ("GCC-exception-3.1", "GCC-exception-3.1"),
    ("GCC exception 2.0", "GCC-exception-2.0"),
    ("GCC-exception-2.0", "GCC-exception-2.0"),
    ("LLVM Exceptions", "LLVM-exception"),
    ("LLVM exception", "LLVM-exception"),
    ("LLVM-exception", "LLVM-exception"),
    ("Assembly exception", "OpenJDK-assembly-exception-1.0"),
    ("OpenJDK Assembly exception", "OpenJDK-assembly-exception-1.0"),
    ("OpenJDK-assembly-exception-1.0", "OpenJDK-assembly-exception-1.0"),
    ("Universal FOSS Exception, Version 1.0", "Universal-FOSS-exception-1.0"),
    ("Universal FOSS exception", "Universal-FOSS-exception-1.0"),
    ("Universal-FOSS-exception-1.0", "Universal-FOSS-exception-1.0"),
    ("Font exception", "Font-exception-2.0"),
    ("Font-exception-2.0", "Font-exception-2.0"),
    ("Autoconf exception 2.0", "Autoconf-exception-2.0"),
    ("Autoconf exception 3.0", "Autoconf-exception-3.0"),
    ("Bison exception", "Bison-exception-2.2"),
    ("Bison exception 2.2", "Bison-exception-2.2"),
    ("Libtool exception", "Libtool-exception"),
    ("Qt LGPL exception 1.1", "Qt-LGPL-exception-1.1"),
    ("wxWindows Library exception 3.1", "WxWindows-exception-3.1"),
    ("FLTK exception", "FLTK-exception"),
    ("LGPL 3.0 linking exception", "LGPL-3.0-linking-exception"),
    ("eCos exception 2.0", "eCos-exception-2.0"),
    ("Swift exception", "Swift-exception"),
    ("Linux syscall note", "Linux-syscall-note"),
    ("Linux-syscall-note", "Linux-syscall-note"),
];

static EXCEPTION_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| EXCEPTION_LABELS.iter().copied().collect());

static EXCEPTION_IDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EXCEPTION_LABELS.iter().map(|(_, id)| *id).collect());

/// Resolve a free-text exception label to an SPDX exception identifier.
pub fn resolve_exception(label: &str) -> Option<&'static str> {
    EXCEPTION_TABLE.get(label.trim()).copied()
}

/// Whether `id` is one of the SPDX exception ids the table resolves to.
pub fn is_exception_id(id: &str) -> bool {
    EXCEPTION_IDS.contains(id)
}

/// All known exception spellings, in table order.
pub fn exception_labels() -> &'static [(&'static str, &'static str)] {
    EXCEPTION_LABELS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_exception() {
        assert_eq!(resolve_exception("Classpath"), Some("Classpath-exception-2.0"));
        assert_eq!(
            resolve_exception("  GCC Runtime Library exception 3.1 "),
            Some("GCC-exception-3.1")
        );
        assert_eq!(resolve_exception("classpath"), None);
        assert_eq!(resolve_exception("Classpath-ish"), None);
    }

    #[test]
    fn test_license_names_are_not_exceptions() {
        assert_eq!(resolve_exception("MIT"), None);
        assert_eq!(resolve_exception("GPL 2.0"), None);
    }

    #[test]
    fn test_table_is_well_formed() {
        let mut seen = HashSet::new();
        for (label, id) in exception_labels() {
            assert!(seen.insert(*label), "duplicate exception label {label:?}");
            assert_eq!(label.trim(), *label);
            assert!(!label.contains('+'), "exception label {label:?} contains '+'");
            assert!(!id.contains(char::is_whitespace));
        }
    }
}
