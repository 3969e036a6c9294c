use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::license::exception::{is_exception_id, resolve_exception};

/// Known license label spellings and their canonical SPDX identifier.
///
/// Matching is exact and case-sensitive. A label that is not listed here is
/// unrecognized; add the spelling instead of loosening the lookup.
static LICENSE_LABELS: &[(&str, &str)] = &[
    // Apache
    ("Apache 1.1", "Apache-1.1"),
    ("Apache License 1.1", "Apache-1.1"),
    ("Apache-1.1", "Apache-1.1"),
    ("The Apache Software License, Version 1.1", "Apache-1.1"),
    ("ASF 2.0", "Apache-2.0"),
    ("ASL 2.0", "Apache-2.0"),
    ("ASL, version 2", "Apache-2.0"),
    ("Apache 2", "Apache-2.0"),
    ("Apache 2.0", "Apache-2.0"),
    ("Apache 2.0 License", "Apache-2.0"),
    ("Apache License (v2.0)", "Apache-2.0"),
    ("Apache License 2.0", "Apache-2.0"),
    ("Apache License v2.0", "Apache-2.0"),
    ("Apache License Version 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("Apache Software License 2.0", "Apache-2.0"),
    ("Apache Software License - Version 2.0", "Apache-2.0"),
    ("Apache v2", "Apache-2.0"),
    ("Apache-2.0", "Apache-2.0"),
    ("The Apache License, Version 2.0", "Apache-2.0"),
    ("The Apache Software License, Version 2.0", "Apache-2.0"),
    // MIT family
    ("Expat", "MIT"),
    ("MIT", "MIT"),
    ("MIT License", "MIT"),
    ("MIT license", "MIT"),
    ("The MIT License", "MIT"),
    ("The MIT License (MIT)", "MIT"),
    ("Bouncy Castle", "MIT"),
    ("Bouncy Castle Licence", "MIT"),
    ("MIT-0", "MIT-0"),
    ("MIT No Attribution", "MIT-0"),
    ("X11", "X11"),
    ("X11 License", "X11"),
    // BSD family
    ("0BSD", "0BSD"),
    ("BSD Zero Clause License", "0BSD"),
    ("Zero-Clause BSD", "0BSD"),
    ("BSD 2-Clause", "BSD-2-Clause"),
    ("BSD 2-Clause License", "BSD-2-Clause"),
    ("BSD-2-Clause", "BSD-2-Clause"),
    ("FreeBSD", "BSD-2-Clause"),
    ("Simplified BSD", "BSD-2-Clause"),
    ("Simplified BSD License", "BSD-2-Clause"),
    ("The BSD 2-Clause License", "BSD-2-Clause"),
    ("3-Clause BSD License", "BSD-3-Clause"),
    ("BSD", "BSD-3-Clause"),
    ("BSD 3-Clause", "BSD-3-Clause"),
    ("BSD 3-Clause License", "BSD-3-Clause"),
    ("BSD License", "BSD-3-Clause"),
    ("BSD licence", "BSD-3-Clause"),
    ("BSD-3-Clause", "BSD-3-Clause"),
    ("EDL 1.0", "BSD-3-Clause"),
    ("Eclipse Distribution License - v 1.0", "BSD-3-Clause"),
    ("Eclipse Distribution License 1.0", "BSD-3-Clause"),
    ("Modified BSD", "BSD-3-Clause"),
    ("New BSD", "BSD-3-Clause"),
    ("New BSD License", "BSD-3-Clause"),
    ("Revised BSD", "BSD-3-Clause"),
    ("The BSD License", "BSD-3-Clause"),
    ("The New BSD License", "BSD-3-Clause"),
    ("BSD 4-Clause", "BSD-4-Clause"),
    ("BSD-4-Clause", "BSD-4-Clause"),
    ("Original BSD", "BSD-4-Clause"),
    // Other permissive
    ("ISC", "ISC"),
    ("ISC License", "ISC"),
    ("Zlib", "Zlib"),
    ("zlib", "Zlib"),
    ("zlib License", "Zlib"),
    ("zlib/libpng License", "Zlib"),
    ("libpng", "Libpng"),
    ("Boost", "BSL-1.0"),
    ("Boost Software License 1.0", "BSL-1.0"),
    ("BSL 1.0", "BSL-1.0"),
    ("BSL-1.0", "BSL-1.0"),
    ("ICU", "ICU"),
    ("ICU License", "ICU"),
    ("Unicode", "Unicode-DFS-2016"),
    ("Unicode License", "Unicode-DFS-2016"),
    ("Unicode, Inc. License", "Unicode-DFS-2016"),
    ("Unicode 3.0", "Unicode-3.0"),
    ("Unicode License v3", "Unicode-3.0"),
    ("W3C", "W3C"),
    ("W3C License", "W3C"),
    ("W3C Software Notice and License", "W3C"),
    ("JSON", "JSON"),
    ("JSON License", "JSON"),
    ("Plexus Classworlds License", "Plexus"),
    ("Indiana University Extreme! Lab Software License", "xpp"),
    ("UPL 1.0", "UPL-1.0"),
    ("UPL-1.0", "UPL-1.0"),
    ("Universal Permissive License v1.0", "UPL-1.0"),
    ("The Universal Permissive License (UPL), Version 1.0", "UPL-1.0"),
    ("Artistic 2.0", "Artistic-2.0"),
    ("Artistic License 2.0", "Artistic-2.0"),
    ("PSF", "PSF-2.0"),
    ("PSF-2.0", "PSF-2.0"),
    ("Python Software Foundation License", "PSF-2.0"),
    ("Python 2.0", "Python-2.0"),
    ("PostgreSQL", "PostgreSQL"),
    ("PostgreSQL License", "PostgreSQL"),
    ("curl", "curl"),
    ("OpenSSL", "OpenSSL"),
    ("OpenSSL License", "OpenSSL"),
    ("Ms-PL", "MS-PL"),
    ("Microsoft Public License", "MS-PL"),
    ("WTFPL", "WTFPL"),
    ("Unlicense", "Unlicense"),
    ("The Unlicense", "Unlicense"),
    // Public domain and Creative Commons
    ("CC0", "CC0-1.0"),
    ("CC0 1.0", "CC0-1.0"),
    ("CC0 1.0 Universal", "CC0-1.0"),
    ("CC0-1.0", "CC0-1.0"),
    ("Creative Commons Zero", "CC0-1.0"),
    ("Public Domain, per Creative Commons CC0", "CC0-1.0"),
    ("Public Domain", "LicenseRef-Public-Domain"),
    ("public domain", "LicenseRef-Public-Domain"),
    ("CC BY 2.5", "CC-BY-2.5"),
    ("CC-BY-2.5", "CC-BY-2.5"),
    ("CC BY 3.0", "CC-BY-3.0"),
    ("CC-BY-3.0", "CC-BY-3.0"),
    ("Creative Commons Attribution 3.0", "CC-BY-3.0"),
    ("CC BY 4.0", "CC-BY-4.0"),
    ("CC-BY-4.0", "CC-BY-4.0"),
    ("Creative Commons Attribution 4.0", "CC-BY-4.0"),
    ("CC BY-SA 3.0", "CC-BY-SA-3.0"),
    ("CC-BY-SA-3.0", "CC-BY-SA-3.0"),
    ("CC BY-SA 4.0", "CC-BY-SA-4.0"),
    ("CC-BY-SA-4.0", "CC-BY-SA-4.0"),
    ("OFL", "OFL-1.1"),
    ("OFL 1.1", "OFL-1.1"),
    ("OFL-1.1", "OFL-1.1"),
    ("SIL Open Font License 1.1", "OFL-1.1"),
    // Eclipse / IBM
    ("CPL 1.0", "CPL-1.0"),
    ("CPL-1.0", "CPL-1.0"),
    ("Common Public License 1.0", "CPL-1.0"),
    ("Common Public License Version 1.0", "CPL-1.0"),
    ("EPL 1.0", "EPL-1.0"),
    ("EPL-1.0", "EPL-1.0"),
    ("Eclipse Public License - Version 1.0", "EPL-1.0"),
    ("Eclipse Public License - v 1.0", "EPL-1.0"),
    ("Eclipse Public License 1.0", "EPL-1.0"),
    ("Eclipse Public License v1.0", "EPL-1.0"),
    ("EPL 2.0", "EPL-2.0"),
    ("EPL-2.0", "EPL-2.0"),
    ("Eclipse Public License - v 2.0", "EPL-2.0"),
    ("Eclipse Public License 2.0", "EPL-2.0"),
    ("Eclipse Public License v2.0", "EPL-2.0"),
    ("ECL 2.0", "ECL-2.0"),
    ("Educational Community License, Version 2.0", "ECL-2.0"),
    // CDDL
    ("CDDL", "CDDL-1.0"),
    ("CDDL 1.0", "CDDL-1.0"),
    ("CDDL-1.0", "CDDL-1.0"),
    ("COMMON DEVELOPMENT AND DISTRIBUTION LICENSE (CDDL) Version 1.0", "CDDL-1.0"),
    ("Common Development and Distribution License 1.0", "CDDL-1.0"),
    ("CDDL 1.1", "CDDL-1.1"),
    ("CDDL 1.1 License", "CDDL-1.1"),
    ("CDDL-1.1", "CDDL-1.1"),
    ("Common Development and Distribution License 1.1", "CDDL-1.1"),
    // Mozilla
    ("MPL 1.1", "MPL-1.1"),
    ("MPL-1.1", "MPL-1.1"),
    ("Mozilla Public License 1.1", "MPL-1.1"),
    ("Mozilla Public License Version 1.1", "MPL-1.1"),
    ("MPL 2.0", "MPL-2.0"),
    ("MPL-2.0", "MPL-2.0"),
    ("MPLv2", "MPL-2.0"),
    ("Mozilla Public License 2.0", "MPL-2.0"),
    ("Mozilla Public License Version 2.0", "MPL-2.0"),
    // GNU
    ("GNU GPL v2", "GPL-2.0-only"),
    ("GNU General Public License v2.0", "GPL-2.0-only"),
    ("GNU General Public License, version 2", "GPL-2.0-only"),
    ("GPL 2.0", "GPL-2.0-only"),
    ("GPL v2", "GPL-2.0-only"),
    ("GPL-2.0", "GPL-2.0-only"),
    ("GPL-2.0-only", "GPL-2.0-only"),
    ("GPLv2", "GPL-2.0-only"),
    ("GPL 2.0 or later", "GPL-2.0-or-later"),
    ("GPL 2.0+", "GPL-2.0-or-later"),
    ("GPL-2.0-or-later", "GPL-2.0-or-later"),
    ("GNU GPL v3", "GPL-3.0-only"),
    ("GNU General Public License v3.0", "GPL-3.0-only"),
    ("GPL 3.0", "GPL-3.0-only"),
    ("GPL v3", "GPL-3.0-only"),
    ("GPL-3.0", "GPL-3.0-only"),
    ("GPL-3.0-only", "GPL-3.0-only"),
    ("GPLv3", "GPL-3.0-only"),
    ("GPL 3.0 or later", "GPL-3.0-or-later"),
    ("GPL 3.0+", "GPL-3.0-or-later"),
    ("GPL-3.0-or-later", "GPL-3.0-or-later"),
    ("LGPL 2.0", "LGPL-2.0-only"),
    ("LGPL-2.0-only", "LGPL-2.0-only"),
    ("GNU LGPL 2.1", "LGPL-2.1-only"),
    ("GNU Lesser General Public License v2.1", "LGPL-2.1-only"),
    ("GNU Lesser General Public License, version 2.1", "LGPL-2.1-only"),
    ("LGPL 2.1", "LGPL-2.1-only"),
    ("LGPL 2.1 only", "LGPL-2.1-only"),
    ("LGPL v2.1", "LGPL-2.1-only"),
    ("LGPL-2.1", "LGPL-2.1-only"),
    ("LGPL-2.1-only", "LGPL-2.1-only"),
    ("LGPLv2.1", "LGPL-2.1-only"),
    ("LGPL 2.1 or later", "LGPL-2.1-or-later"),
    ("LGPL 2.1+", "LGPL-2.1-or-later"),
    ("LGPL-2.1-or-later", "LGPL-2.1-or-later"),
    ("GNU LGPL 3.0", "LGPL-3.0-only"),
    ("GNU Lesser General Public License v3.0", "LGPL-3.0-only"),
    ("LGPL 3.0", "LGPL-3.0-only"),
    ("LGPL v3", "LGPL-3.0-only"),
    ("LGPL-3.0", "LGPL-3.0-only"),
    ("LGPL-3.0-only", "LGPL-3.0-only"),
    ("LGPLv3", "LGPL-3.0-only"),
    ("LGPL 3.0 or later", "LGPL-3.0-or-later"),
    ("LGPL 3.0+", "LGPL-3.0-or-later"),
    ("LGPL-3.0-or-later", "LGPL-3.0-or-later"),
    ("AGPL 3.0", "AGPL-3.0-only"),
    ("AGPL v3", "AGPL-3.0-only"),
    ("AGPLv3", "AGPL-3.0-only"),
    ("GNU AGPL v3", "AGPL-3.0-only"),
    // Other copyleft and source-available
    ("EUPL 1.1", "EUPL-1.1"),
    ("EUPL 1.2", "EUPL-1.2"),
    ("Elastic License 2.0", "Elastic-2.0"),
    ("Ruby", "Ruby"),
    ("Ruby License", "Ruby"),
    // Vendor licenses without an SPDX identifier
    ("JetBrains User Agreement", "LicenseRef-JetBrains-User-Agreement"),
];

static LICENSE_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| LICENSE_LABELS.iter().copied().collect());

static LICENSE_IDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| LICENSE_LABELS.iter().map(|(_, id)| *id).collect());

/// Resolve a free-text license label to an SPDX identifier or `WITH` expression.
///
/// A label with exactly two non-empty `+`-separated parts is a compound
/// `license + exception` label; both halves must resolve or the whole label is
/// unrecognized. Any other shape is looked up as a single label, which is how
/// spellings such as `LGPL 2.1+` are matched.
pub fn resolve(label: &str) -> Option<String> {
    let trimmed = label.trim();

    if let Some((main, exception)) = split_compound(trimmed) {
        let main_id = lookup_label(main)?;
        let exception_id = resolve_exception(exception)?;
        return Some(format!("{main_id} WITH {exception_id}"));
    }

    lookup_label(trimmed).map(str::to_string)
}

/// Look up a single (non-compound) label in the label table.
pub fn lookup_label(label: &str) -> Option<&'static str> {
    LICENSE_TABLE.get(label.trim()).copied()
}

/// All known label spellings, in table order.
pub fn license_labels() -> &'static [(&'static str, &'static str)] {
    LICENSE_LABELS
}

/// Whether `id` is something [`resolve`] can produce: a license id from the
/// table, or `<license-id> WITH <exception-id>`.
pub fn is_known_id(id: &str) -> bool {
    match id.split_once(" WITH ") {
        Some((license, exception)) => LICENSE_IDS.contains(license) && is_exception_id(exception),
        None => LICENSE_IDS.contains(id),
    }
}

fn split_compound(label: &str) -> Option<(&str, &str)> {
    if !label.contains('+') {
        return None;
    }
    let parts: Vec<&str> = label.split('+').map(str::trim).collect();
    match parts.as_slice() {
        [main, exception] if !main.is_empty() && !exception.is_empty() => {
            Some((main, exception))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_ids() {
        assert!(is_known_id("MIT"));
        assert!(is_known_id("GPL-2.0-only WITH Classpath-exception-2.0"));
        assert!(!is_known_id("mit"));
        assert!(!is_known_id("MIT License"));
        assert!(!is_known_id("MIT WITH Made-up-exception"));
        assert!(!is_known_id("Made-up WITH Classpath-exception-2.0"));
    }

    #[test]
    fn test_every_resolved_id_is_known() {
        for (label, _) in license_labels() {
            let id = resolve(label).unwrap();
            assert!(is_known_id(&id), "{id} from {label:?}");
        }
        let compound = resolve("GPL 2.0 + Classpath").unwrap();
        assert!(is_known_id(&compound));
    }

    #[test]
    fn test_exact_match_after_trim() {
        assert_eq!(resolve("MIT").as_deref(), Some("MIT"));
        assert_eq!(resolve(" MIT ").as_deref(), Some("MIT"));
        assert_eq!(resolve("\tApache 2.0\n").as_deref(), Some("Apache-2.0"));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(resolve("mit"), None);
        assert_eq!(resolve("APACHE 2.0"), None);
    }

    #[test]
    fn test_no_substring_or_fuzzy_match() {
        assert_eq!(resolve("MIT-ish"), None);
        assert_eq!(resolve("Apache 2.0 (modified)"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_compound_expression() {
        assert_eq!(
            resolve("GPL 2.0 + Classpath").as_deref(),
            Some("GPL-2.0-only WITH Classpath-exception-2.0")
        );
        assert_eq!(
            resolve("  Apache 2.0+LLVM exception ").as_deref(),
            Some("Apache-2.0 WITH LLVM-exception")
        );
    }

    #[test]
    fn test_compound_with_unknown_half_does_not_fall_back() {
        assert_eq!(resolve("GPL 2.0 + Nonexistent exception"), None);
        assert_eq!(resolve("Made-up License + Classpath"), None);
        // exception spelling is not a license spelling and vice versa
        assert_eq!(resolve("Classpath + GPL 2.0"), None);
    }

    #[test]
    fn test_malformed_compound_tries_whole_label() {
        assert_eq!(resolve("A + B + C"), None);
        assert_eq!(resolve("GPL 2.0 + Classpath + MIT"), None);
        // empty second half: the whole label is looked up instead
        assert_eq!(resolve("LGPL 2.1+").as_deref(), Some("LGPL-2.1-or-later"));
        assert_eq!(resolve("GPL 2.0+").as_deref(), Some("GPL-2.0-or-later"));
        assert_eq!(resolve("+ Classpath"), None);
    }

    #[test]
    fn test_same_id_spellings_resolve_equal() {
        let apache = ["Apache 2.0", "Apache License, Version 2.0", "ASL 2.0"];
        for label in apache {
            assert_eq!(resolve(label), resolve("Apache-2.0"), "label {label}");
        }
        for (label, id) in license_labels() {
            assert_eq!(resolve(label).as_deref(), Some(*id), "label {label}");
        }
    }

    #[test]
    fn test_table_has_no_duplicate_labels() {
        let mut seen = HashSet::new();
        for (label, _) in license_labels() {
            assert!(seen.insert(*label), "duplicate label {label:?}");
        }
        assert_eq!(LICENSE_TABLE.len(), license_labels().len());
    }

    #[test]
    fn test_table_entries_are_well_formed() {
        for (label, id) in license_labels() {
            assert_eq!(label.trim(), *label, "untrimmed label {label:?}");
            assert!(!label.is_empty());
            assert!(
                !id.is_empty() && !id.contains(char::is_whitespace),
                "id for {label:?} must be a single SPDX token, got {id:?}"
            );
        }
    }

    #[test]
    fn test_compound_labels_are_not_tabled() {
        // two-part `+` labels never reach the table, so tabling one would be dead data
        for (label, _) in license_labels() {
            assert!(split_compound(label).is_none(), "label {label:?} is compound");
        }
    }
}
