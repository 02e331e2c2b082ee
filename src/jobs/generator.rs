//! Writes rendered manifests for every job type and repository

use super::{load_job_dir, JobType, ManifestRenderer};
use crate::config::GeneratorConfig;
use crate::expansion::{Mapper, ReleaseBranchMapper};
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct GenerateSummary {
    pub written: Vec<PathBuf>,
}

/// The mapper chain applied to every job directory.
pub fn default_mappers(config: &GeneratorConfig) -> Vec<Box<dyn Mapper>> {
    vec![Box::new(ReleaseBranchMapper::new(
        config.release_branch_placeholder.clone(),
        config.release_branches.clone(),
    ))]
}

/// Manifest template for a job type: the override folder's copy when one is
/// configured, the built-in template otherwise.
pub fn manifest_template(config: &GeneratorConfig, repo_root: &Path, job_type: JobType) -> Result<String> {
    match &config.template_folder {
        Some(folder) => {
            let path = repo_root.join(folder).join(job_type.template_file_name());
            fs::read_to_string(&path).map_err(|e| Error::io(path, e))
        }
        None => Ok(job_type.builtin_template().to_string()),
    }
}

/// Regenerate every manifest under `repo_root`.
///
/// The org folder under the jobs folder is removed first so manifests for
/// deleted job descriptions do not linger. Any error aborts the run.
pub fn generate_all(config: &GeneratorConfig, repo_root: &Path) -> Result<GenerateSummary> {
    let builder_base_tag = config.resolve_builder_base_tag(repo_root)?;
    let output_root = repo_root.join(&config.jobs_folder);
    let org_folder = output_root.join(&config.org);

    match fs::remove_dir_all(&org_folder) {
        Ok(()) => debug!("Removed {}", org_folder.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(org_folder, e)),
    }

    let mappers = default_mappers(config);
    let renderer = ManifestRenderer::new(config, builder_base_tag);
    let mut summary = GenerateSummary::default();

    for job_type in JobType::ALL {
        let template = manifest_template(config, repo_root, job_type)?;

        for repo in config.repos.for_job_type(job_type) {
            let job_dir = repo_root
                .join(&config.source_folder)
                .join(job_type.as_str())
                .join(repo);
            let jobs = load_job_dir(&job_dir, &mappers)?;

            let repo_name = format!("{}/{}", config.org, repo);
            let manifests = renderer.render_all(job_type, &template, &repo_name, &jobs)?;

            for (file_name, contents) in manifests {
                let path = output_root.join(&repo_name).join(&file_name);
                write_manifest(&path, &contents)?;
                summary.written.push(path);
            }
        }

        info!("Generated {} jobs", job_type);
    }

    info!("Wrote {} manifests", summary.written.len());
    Ok(summary)
}

fn write_manifest(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
