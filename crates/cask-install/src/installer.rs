use std::path::{Path, PathBuf};
use std::sync::Arc;

use cask_fetch::{Download, Fetcher, HttpClient};
use cask_fs::Workspace;
use cask_manifest::{Manifest, ManifestError};
use cask_resolve::ResolvedArtifact;
use cask_state::{InstallationRecord, PackageLock, StateStore};

use crate::error::{InstallError, Result};
use crate::options::InstallerOptions;
use crate::outcome::{InstallOutcome, InstallStatus, PlannedAction, UninstallReport};
use crate::placement::Placement;
use crate::plan;

const STAGING_PREFIX: &str = ".cask-staging-";

/// Installs packages into one binary directory, recording them in `S`.
pub struct Installer<C: HttpClient, S: StateStore> {
    fetcher: Fetcher<C>,
    store:   Arc<S>,
    bin_dir: PathBuf,
    options: InstallerOptions,
}

impl<C: HttpClient, S: StateStore + 'static> Installer<C, S> {
    /// `work_dir` holds temporary downloads; `bin_dir` receives binaries and
    /// their staging directories. A relative `bin_dir` is resolved against
    /// the current directory now, so records always hold absolute paths.
    pub fn new(client: C, store: S, bin_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        let bin_dir = bin_dir.into();
        Self {
            fetcher: Fetcher::new(client, work_dir),
            store:   Arc::new(store),
            bin_dir: std::path::absolute(&bin_dir).unwrap_or(bin_dir),
            options: InstallerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InstallerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn bin_dir(&self) -> &Path { &self.bin_dir }

    pub fn store(&self) -> &S { &self.store }

    pub fn options(&self) -> &InstallerOptions { &self.options }

    fn targets(&self, manifest: &Manifest) -> Vec<PathBuf> {
        manifest
            .binaries()
            .iter()
            .map(|binary| self.bin_dir.join(binary.target()))
            .collect()
    }

    /// Reject a manifest that breaks its invariants, or an artifact resolved
    /// from another manifest, before anything touches the filesystem.
    fn check(&self, artifact: &ResolvedArtifact, manifest: &Manifest) -> Result<()> {
        manifest.validate()?;
        if artifact.package != manifest.name() {
            return Err(ManifestError::Validation {
                reason: format!(
                    "artifact is for `{}` but the manifest describes `{}`",
                    artifact.package,
                    manifest.name()
                ),
            }
            .into());
        }
        if !self.bin_dir.is_absolute() {
            return Err(ManifestError::Validation {
                reason: format!("binary directory `{}` is not absolute", self.bin_dir.display()),
            }
            .into());
        }
        Ok(())
    }

    /// Run store work on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&*store)).await?
    }

    /// Validate, resolve and install in one call.
    pub async fn install_manifest(&self, manifest: &Manifest, requested_version: &str) -> Result<InstallOutcome> {
        manifest.validate()?;
        let artifact = cask_resolve::resolve(manifest, requested_version)?;
        self.install(&artifact, manifest).await
    }

    /// Install `artifact`, replacing any other version of the package.
    ///
    /// Dropping the returned future before the download finishes leaves
    /// nothing behind. Once placement starts it runs to completion on a
    /// blocking thread, even if the caller goes away.
    pub async fn install(&self, artifact: &ResolvedArtifact, manifest: &Manifest) -> Result<InstallOutcome> {
        self.check(artifact, manifest)?;

        let package = manifest.name().to_string();
        let targets = self.targets(manifest);
        let url = artifact.concrete_url.to_string();

        let prepared = {
            let package = package.clone();
            let targets = targets.clone();
            let artifact = artifact.clone();
            let force = self.options.force;
            self.blocking(move |store| prepare(store, &package, &artifact, &targets, force))
                .await?
        };
        let (lock, previous) = match prepared {
            Prepared::Current(record) => {
                tracing::info!(%package, version = %record.installed_version, "already installed");
                return Ok(InstallOutcome::AlreadyInstalled(record));
            }
            Prepared::Proceed { lock, previous } => (lock, previous),
        };

        let options = self.options.fetch.clone().checksum(artifact.expected_hash);
        let download = self
            .fetcher
            .fetch(&url, &artifact.file_name, &options)
            .await
            .map_err(|e| InstallError::from_fetch(&url, e))?;

        let commit = Commit {
            _lock: lock,
            download,
            bin_dir: self.bin_dir.clone(),
            package,
            version: artifact.version.clone(),
            url,
            integrity_checked: artifact.is_verified(),
            sources: manifest.binaries().iter().map(|b| b.source().to_string()).collect(),
            targets,
            previous,
        };
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || commit.run(store.as_ref())).await??;

        tracing::info!("{outcome}");
        Ok(outcome)
    }

    /// Remove every recorded file of `package`.
    ///
    /// Files that cannot be removed stay in the record and are listed in
    /// [`UninstallReport::remaining`]; the record goes only when all are gone.
    pub async fn uninstall(&self, package: &str) -> Result<UninstallReport> {
        let package = package.to_string();
        self.blocking(move |store| {
            let _lock = store.lock(&package)?;
            let Some(mut record) = store.load(&package)? else {
                return Err(InstallError::NotInstalled { package });
            };

            let mut removed = Vec::new();
            let mut remaining = Vec::new();
            for path in &record.installed_paths {
                match cask_fs::remove_file_if_exists(path) {
                    Ok(existed) => {
                        if !existed {
                            tracing::debug!(path = %path.display(), "already absent");
                        }
                        removed.push(path.clone());
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "could not remove");
                        remaining.push(path.clone());
                    }
                }
            }

            if remaining.is_empty() {
                store.remove(&package)?;
                tracing::info!(%package, version = %record.installed_version, "uninstalled");
            } else {
                record.retain_paths(&remaining);
                store.save(&record)?;
                tracing::warn!(%package, remaining = remaining.len(), "uninstall incomplete");
            }

            Ok(UninstallReport {
                package,
                version: record.installed_version,
                removed,
                remaining,
            })
        })
        .await
    }

    /// Compare the recorded files with what is on disk.
    pub async fn verify_installed(&self, package: &str) -> Result<InstallStatus> {
        let package = package.to_string();
        self.blocking(move |store| {
            Ok(match store.load(&package)? {
                None => InstallStatus::NotInstalled,
                Some(record) => plan::check_files(&record).into_status(&record.installed_version),
            })
        })
        .await
    }

    /// What [`Installer::install_manifest`] would do, without downloading or
    /// writing anything.
    pub async fn dry_run(&self, manifest: &Manifest, requested_version: &str) -> Result<PlannedAction> {
        manifest.validate()?;
        let artifact = cask_resolve::resolve(manifest, requested_version)?;
        self.plan(&artifact, manifest).await
    }

    /// What [`Installer::install`] would do with `artifact`. Fails with
    /// [`InstallError::Conflict`] exactly when `install` would.
    pub async fn plan(&self, artifact: &ResolvedArtifact, manifest: &Manifest) -> Result<PlannedAction> {
        self.check(artifact, manifest)?;
        let artifact = artifact.clone();
        let targets = self.targets(manifest);
        let package = manifest.name().to_string();
        let force = self.options.force;
        self.blocking(move |store| {
            let record = store.load(&package)?;
            let action = plan::plan(record.as_ref(), &artifact, &targets);
            if action != PlannedAction::NoOp {
                check_conflict(&package, record.as_ref(), &targets, force)?;
            }
            Ok(action)
        })
        .await
    }

    /// Every installed package, by name.
    pub async fn list(&self) -> Result<Vec<InstallationRecord>> {
        self.blocking(|store| Ok(store.list()?)).await
    }
}

enum Prepared {
    /// The record already matches and its files are intact.
    Current(InstallationRecord),
    Proceed {
        lock:     PackageLock,
        previous: Option<InstallationRecord>,
    },
}

fn prepare<S: StateStore + ?Sized>(
    store: &S,
    package: &str,
    artifact: &ResolvedArtifact,
    targets: &[PathBuf],
    force: bool,
) -> Result<Prepared> {
    let lock = store.lock(package)?;
    let previous = store.load(package)?;

    if let Some(record) = &previous {
        if plan::matches_artifact(record, artifact, targets) {
            if plan::check_files(record).is_intact() {
                return Ok(Prepared::Current(record.clone()));
            }
            tracing::warn!(package, "installed files are missing or altered, reinstalling");
        }
    }

    check_conflict(package, previous.as_ref(), targets, force)?;
    Ok(Prepared::Proceed { lock, previous })
}

fn check_conflict(
    package: &str,
    previous: Option<&InstallationRecord>,
    targets: &[PathBuf],
    force: bool,
) -> Result<()> {
    if let Some(path) = plan::find_conflict(previous, targets) {
        if !force {
            return Err(InstallError::Conflict {
                package: package.to_string(),
                path,
            });
        }
        tracing::warn!(package, path = %path.display(), "overwriting unowned file");
    }
    Ok(())
}

/// Everything after the download: staging, placement and the record.
struct Commit {
    _lock:             PackageLock,
    download:          Download,
    bin_dir:           PathBuf,
    package:           String,
    version:           String,
    url:               String,
    integrity_checked: bool,
    sources:           Vec<String>,
    targets:           Vec<PathBuf>,
    previous:          Option<InstallationRecord>,
}

impl Commit {
    fn run<S: StateStore + ?Sized>(self, store: &S) -> Result<InstallOutcome> {
        let staging = Workspace::new_in(&self.bin_dir, STAGING_PREFIX)?;
        let sources: Vec<&str> = self.sources.iter().map(String::as_str).collect();
        let staged = cask_archive::extract_entries(
            self.download.path(),
            self.download.file_name(),
            &sources,
            staging.path(),
        )
        .map_err(|e| InstallError::from_archive(&self.url, e))?;
        drop(self.download);

        let mut record = InstallationRecord::new(&self.package, &self.version, &self.url, self.integrity_checked);
        for (entry, target) in staged.iter().zip(&self.targets) {
            cask_fs::set_executable(&entry.path)?;
            let digest = cask_verify::hash_file(&entry.path).map_err(|e| cask_fs::Error::Read {
                path:   entry.path.clone(),
                source: e,
            })?;
            record = record.with_path(target, digest);
        }

        let mut placement = Placement::new(staging.path());
        for (entry, target) in staged.iter().zip(&self.targets) {
            if let Err(e) = placement.place(&entry.path, target) {
                return Err(undo(placement, &record, e.into()));
            }
        }
        if let Err(e) = store.save(&record) {
            return Err(undo(placement, &record, e.into()));
        }
        drop(placement);

        if let Some(previous) = &self.previous {
            for path in previous.installed_paths.iter().filter(|p| !record.owns(p)) {
                match cask_fs::remove_file_if_exists(path) {
                    Ok(_) => tracing::debug!(path = %path.display(), "removed superseded file"),
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove superseded file"),
                }
            }
        }
        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "could not remove staging directory");
        }

        Ok(match self.previous {
            None => InstallOutcome::Installed(record),
            Some(previous) if previous.installed_version == record.installed_version => {
                InstallOutcome::Reinstalled(record)
            }
            Some(previous) => InstallOutcome::Upgraded {
                previous_version: previous.installed_version,
                record,
            },
        })
    }
}

fn undo(placement: Placement<'_>, record: &InstallationRecord, cause: InstallError) -> InstallError {
    match placement.rollback() {
        Ok(()) => cause,
        Err(paths) => {
            tracing::error!(package = %record.package_name, error = %cause, "rollback incomplete");
            InstallError::InconsistentState {
                package: record.package_name.clone(),
                paths,
                expected: Box::new(record.clone()),
            }
        }
    }
}
