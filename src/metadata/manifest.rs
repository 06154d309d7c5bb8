use std::fmt::{self, Display};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A fully loaded cookbook metadata manifest.
///
/// Construction goes through [`MetadataBuilder`](crate::metadata::MetadataBuilder)
/// or [`load`](crate::metadata::load); the record itself is never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookbookMetadata {
    /// Derived from the package directory name; not declared in the manifest.
    pub name: String,
    pub maintainer: Option<String>,
    pub maintainer_email: Option<String>,
    pub license: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub version: Option<String>,
    pub depends: Vec<Dependency>,
    pub supports: IndexSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub constraint: Option<String>,
}

impl Display for CookbookMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cookbook: {}", self.name)?;
        if let Some(version) = &self.version {
            writeln!(f, "Version: {}", version)?;
        }
        match (&self.maintainer, &self.maintainer_email) {
            (Some(name), Some(email)) => writeln!(f, "Maintainer: {} <{}>", name, email)?,
            (Some(name), None) => writeln!(f, "Maintainer: {}", name)?,
            (None, Some(email)) => writeln!(f, "Maintainer: <{}>", email)?,
            (None, None) => {}
        }
        if let Some(license) = &self.license {
            writeln!(f, "License: {}", license)?;
        }
        if let Some(description) = &self.description {
            writeln!(f, "Description: {}", description)?;
        }
        if !self.depends.is_empty() {
            writeln!(f, "Depends:")?;
            for dependency in &self.depends {
                match &dependency.constraint {
                    Some(constraint) => {
                        writeln!(f, "  - {} ({})", dependency.name, constraint)?
                    }
                    None => writeln!(f, "  - {}", dependency.name)?,
                }
            }
        }
        if !self.supports.is_empty() {
            let platforms = self
                .supports
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "Supports: {}", platforms)?;
        }
        if let Some(long_description) = &self.long_description {
            writeln!(f)?;
            writeln!(f, "{}", long_description.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_renders_a_summary() {
        let metadata = CookbookMetadata {
            name: "etckeeper".to_string(),
            maintainer: Some("Promet Solutions".to_string()),
            maintainer_email: Some("marius@promethost.com".to_string()),
            license: Some("Apache 2.0".to_string()),
            description: Some("Installs/Configures etckeeper".to_string()),
            long_description: None,
            version: Some("0.1".to_string()),
            depends: vec![Dependency {
                name: "git".to_string(),
                constraint: None,
            }],
            supports: ["ubuntu", "debian"].iter().map(|s| s.to_string()).collect(),
        };

        let rendered = metadata.to_string();
        assert_eq!(
            rendered,
            "\
Cookbook: etckeeper
Version: 0.1
Maintainer: Promet Solutions <marius@promethost.com>
License: Apache 2.0
Description: Installs/Configures etckeeper
Depends:
  - git
Supports: ubuntu, debian
"
        );
    }
}
