//! Remote template fetching
//!
//! Remote templates are downloaded as the hosting provider's zip archive for a
//! ref and unpacked into a staging directory:
//! - The archive's single top-level folder (e.g. `repo-main/`) is stripped
//! - When the reference names a subdirectory, only that subtree is kept

use super::source::{Provider, RemoteRef};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use url::Url;
use zip::ZipArchive;

/// Template fetcher - downloads and unpacks provider archives
pub struct TemplateFetcher {
    client: reqwest::Client,
    base_urls: HashMap<Provider, Url>,
}

impl TemplateFetcher {
    /// Create a fetcher using the default provider hosts
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut base_urls = HashMap::new();
        for provider in Provider::all() {
            let url = Url::parse(provider.default_base_url())
                .with_context(|| format!("Invalid {} URL", provider))?;
            base_urls.insert(provider, url);
        }

        Ok(Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_urls,
        })
    }

    /// Create a fetcher, honoring `SCAFFOLD_<PROVIDER>_URL` overrides
    pub fn from_env(user_agent: &str) -> Result<Self> {
        let mut fetcher = Self::new(user_agent)?;
        for provider in Provider::all() {
            if let Ok(url_str) = std::env::var(provider.base_url_env()) {
                fetcher = fetcher.with_base_url(provider, &url_str)?;
            }
        }
        Ok(fetcher)
    }

    /// Point a provider at a different host (mirrors, tests)
    pub fn with_base_url(mut self, provider: Provider, url_str: &str) -> Result<Self> {
        let url = Url::parse(url_str)
            .with_context(|| format!("Invalid {} URL: {}", provider, url_str))?;
        self.base_urls.insert(provider, url);
        Ok(self)
    }

    /// Build a URL by appending path segments to a base, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Archive URL for a remote reference
    pub fn archive_url(&self, remote: &RemoteRef) -> Result<Url> {
        let base = self
            .base_urls
            .get(&remote.provider)
            .ok_or_else(|| anyhow::anyhow!("No URL configured for {}", remote.provider))?;
        let git_ref = remote.git_ref();
        let owner = remote.owner.as_str();
        let repo = remote.repo.as_str();

        match remote.provider {
            Provider::GitHub => {
                let file = format!("{}.zip", git_ref);
                Self::build_url(base, &[owner, repo, "archive", &file])
            }
            Provider::GitLab => {
                let file = format!("{}-{}.zip", repo, git_ref);
                Self::build_url(base, &[owner, repo, "-", "archive", git_ref, &file])
            }
            Provider::Bitbucket => {
                let file = format!("{}.zip", git_ref);
                Self::build_url(base, &[owner, repo, "get", &file])
            }
        }
    }

    /// Download `remote` into `dest` and return the template root inside it
    pub async fn download(&self, remote: &RemoteRef, dest: &Path) -> Result<PathBuf> {
        let url = self.archive_url(remote)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch template archive from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch template {} from {}: HTTP {}",
                remote,
                url,
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read template archive from {}", url))?;

        let extracted = extract_archive(&bytes, dest, remote.subdir.as_deref())
            .with_context(|| format!("Failed to unpack template {}", remote))?;

        if extracted == 0 {
            match &remote.subdir {
                Some(subdir) => anyhow::bail!(
                    "Subdirectory '{}' not found in template {}",
                    subdir,
                    remote
                ),
                None => anyhow::bail!("Template {} archive is empty", remote),
            }
        }

        Ok(dest.to_path_buf())
    }
}

/// Unpack a provider archive into `dest`, stripping the top-level folder and
/// keeping only `subdir` when given. Returns the number of entries written.
pub fn extract_archive(zip_bytes: &[u8], dest: &Path, subdir: Option<&str>) -> Result<usize> {
    let mut archive =
        ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read zip archive")?;

    let subdir_components: Vec<String> = subdir
        .map(|s| {
            s.split('/')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut written = 0;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        // Entries with absolute paths or `..` are skipped
        let Some(enclosed) = file.enclosed_name() else {
            continue;
        };

        let components: Vec<String> = enclosed
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        // Drop the archive's top-level folder, then the requested subdirectory
        let Some(rest) = components.get(1..) else {
            continue;
        };
        if !rest.starts_with(&subdir_components) {
            continue;
        }
        let relative: PathBuf = rest[subdir_components.len()..].iter().collect();
        if relative.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest.join(&relative);

        if file.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("Failed to create directory: {}", out_path.display()))?;
            written += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;

        if is_symlink_mode(file.unix_mode()) {
            let target = PathBuf::from(String::from_utf8_lossy(&contents).into_owned());
            // Links that point outside the destination are dropped
            if !stays_inside(&relative, &target) {
                continue;
            }
            write_symlink(&target, &out_path, &contents)?;
            written += 1;
            continue;
        }

        fs::write(&out_path, &contents)
            .with_context(|| format!("Failed to write file: {}", out_path.display()))?;

        restore_mode(&out_path, file.unix_mode())?;

        written += 1;
    }

    Ok(written)
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

fn is_symlink_mode(mode: Option<u32>) -> bool {
    mode.is_some_and(|m| m & S_IFMT == S_IFLNK)
}

/// Whether a link at `link` (relative to the destination) resolves inside it
fn stays_inside(link: &Path, target: &Path) -> bool {
    let mut depth = link.components().count().saturating_sub(1) as isize;
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path, _contents: &[u8]) -> Result<()> {
    std::os::unix::fs::symlink(target, link)
        .with_context(|| format!("Failed to create symlink: {}", link.display()))
}

/// Without symlink support the link is materialized as a file holding its target
#[cfg(not(unix))]
fn write_symlink(_target: &Path, link: &Path, contents: &[u8]) -> Result<()> {
    fs::write(link, contents).with_context(|| format!("Failed to write file: {}", link.display()))
}

#[cfg(unix)]
fn restore_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode.map(|m| m & 0o777) {
        Some(bits) if bits != 0 => fs::set_permissions(path, fs::Permissions::from_mode(bits))
            .with_context(|| format!("Failed to set permissions: {}", path.display())),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn restore_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
