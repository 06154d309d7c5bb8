use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use tracing::{debug, info};

use crate::config::DEFAULT_MANIFEST_FILE;
use crate::errors::{AppError, AppResult};
use crate::metadata::manifest::{CookbookMetadata, Dependency};
use crate::metadata::parser::{parse_manifest, Declaration, LongDescriptionSource};

/// Accumulates declarations during a load and produces the immutable record.
#[derive(Debug, Default)]
pub struct MetadataBuilder {
    name: String,
    maintainer: Option<String>,
    maintainer_email: Option<String>,
    license: Option<String>,
    description: Option<String>,
    long_description: Option<String>,
    version: Option<String>,
    depends: Vec<Dependency>,
    supports: IndexSet<String>,
}

impl MetadataBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        MetadataBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a platform identifier. Declaring the same platform twice is a
    /// no-op; the set never holds duplicates.
    pub fn declare_platform_support(&mut self, platform: impl Into<String>) {
        self.supports.insert(platform.into());
    }

    /// Adds a dependency entry. Names must be non-empty; a repeated name
    /// keeps the first entry.
    pub fn declare_dependency(
        &mut self,
        name: impl Into<String>,
        constraint: Option<String>,
    ) -> AppResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::InvalidDeclaration(
                "dependency name must not be empty".to_string(),
            ));
        }
        if self.depends.iter().all(|d| d.name != name) {
            self.depends.push(Dependency { name, constraint });
        }
        Ok(())
    }

    pub fn build(self) -> CookbookMetadata {
        CookbookMetadata {
            name: self.name,
            maintainer: self.maintainer,
            maintainer_email: self.maintainer_email,
            license: self.license,
            description: self.description,
            long_description: self.long_description,
            version: self.version,
            depends: self.depends,
            supports: self.supports,
        }
    }
}

/// Loads the manifest inside `package_dir` into a fully populated record.
///
/// Construction is all-or-nothing: any read or parse failure surfaces as an
/// error and no partial record escapes.
pub fn load(package_dir: &Path, manifest_file: &str) -> AppResult<CookbookMetadata> {
    if !package_dir.is_dir() {
        return Err(AppError::PackageDirNotFound(package_dir.to_path_buf()));
    }
    let package_dir = package_dir.canonicalize()?;

    let manifest_path = package_dir.join(manifest_file);
    if !manifest_path.is_file() {
        return Err(AppError::ManifestNotFound(
            package_dir.clone(),
            manifest_file.to_string(),
        ));
    }

    debug!("reading manifest {}", manifest_path.display());
    let source = fs::read_to_string(&manifest_path)?;
    let declarations = parse_manifest(&source)?;

    let mut builder = MetadataBuilder::new(package_name(&package_dir));

    for declaration in declarations {
        match declaration {
            Declaration::Maintainer(value) => builder.maintainer = Some(value),
            Declaration::MaintainerEmail(value) => builder.maintainer_email = Some(value),
            Declaration::License(value) => builder.license = Some(value),
            Declaration::Description(value) => builder.description = Some(value),
            Declaration::Version(value) => builder.version = Some(value),
            Declaration::LongDescription(LongDescriptionSource::Inline(text)) => {
                builder.long_description = Some(text);
            }
            Declaration::LongDescription(LongDescriptionSource::File(file)) => {
                builder.long_description = Some(read_description_document(&package_dir, &file)?);
            }
            Declaration::Depends { name, constraint } => {
                builder.declare_dependency(name, constraint)?;
            }
            Declaration::Supports(platforms) => {
                for platform in platforms {
                    builder.declare_platform_support(platform);
                }
            }
        }
    }

    let metadata = builder.build();
    info!(cookbook = %metadata.name, "loaded manifest");
    Ok(metadata)
}

/// Loads the manifest using the standard `metadata.rb` file name.
pub fn load_default(package_dir: &Path) -> AppResult<CookbookMetadata> {
    load(package_dir, DEFAULT_MANIFEST_FILE)
}

fn package_name(package_dir: &Path) -> String {
    package_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

fn read_description_document(package_dir: &Path, file: &str) -> AppResult<String> {
    let path = package_dir.join(file);
    if !path.is_file() {
        return Err(AppError::DescriptionNotFound(path));
    }
    Ok(fs::read_to_string(&path)?)
}
