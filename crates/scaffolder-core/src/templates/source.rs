//! Template source resolution (local path vs. provider-qualified repository)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Hosting provider for remote templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    GitHub,
    GitLab,
    Bitbucket,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
            Provider::Bitbucket => "bitbucket",
        }
    }

    /// Default host serving archives for this provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::GitHub => "https://github.com",
            Provider::GitLab => "https://gitlab.com",
            Provider::Bitbucket => "https://bitbucket.org",
        }
    }

    /// Environment variable overriding [`Provider::default_base_url`]
    pub fn base_url_env(&self) -> &'static str {
        match self {
            Provider::GitHub => "SCAFFOLD_GITHUB_URL",
            Provider::GitLab => "SCAFFOLD_GITLAB_URL",
            Provider::Bitbucket => "SCAFFOLD_BITBUCKET_URL",
        }
    }

    /// Ref used when the reference doesn't name one
    pub fn default_ref(&self) -> &'static str {
        match self {
            Provider::GitHub => "HEAD",
            Provider::GitLab | Provider::Bitbucket => "main",
        }
    }

    pub fn all() -> [Provider; 3] {
        [Provider::GitHub, Provider::GitLab, Provider::Bitbucket]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Provider {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" | "gh" => Ok(Provider::GitHub),
            "gitlab" => Ok(Provider::GitLab),
            "bitbucket" => Ok(Provider::Bitbucket),
            _ => Err(SourceError::UnknownProvider(s.to_string())),
        }
    }
}

/// Errors raised while classifying a source string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("Unsupported provider '{0}' (expected github, gitlab, or bitbucket)")]
    UnknownProvider(String),

    #[error("Invalid repository reference '{0}' (expected owner/repo)")]
    InvalidRepository(String),

    #[error("Cannot expand '~': home directory is unknown")]
    NoHomeDirectory,
}

/// A parsed `[provider:]owner/repo[/subdir][#ref]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub provider: Provider,
    pub owner: String,
    pub repo: String,
    /// Path inside the repository to use as the template root
    pub subdir: Option<String>,
    /// Branch, tag, or commit; `None` means the provider default
    pub reference: Option<String>,
}

impl RemoteRef {
    /// The ref to download, falling back to the provider default
    pub fn git_ref(&self) -> &str {
        self.reference
            .as_deref()
            .unwrap_or_else(|| self.provider.default_ref())
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.provider, self.owner, self.repo)?;
        if let Some(subdir) = &self.subdir {
            write!(f, "/{}", subdir)?;
        }
        if let Some(reference) = &self.reference {
            write!(f, "#{}", reference)?;
        }
        Ok(())
    }
}

impl FromStr for RemoteRef {
    type Err = SourceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (provider, rest) = match input.split_once(':') {
            Some((provider, rest)) => (provider.parse()?, rest),
            None => (Provider::GitHub, input),
        };

        let (path, reference) = match rest.split_once('#') {
            Some((path, reference)) if !reference.is_empty() => {
                (path, Some(reference.to_string()))
            }
            Some((path, _)) => (path, None),
            None => (rest, None),
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let (owner, repo) = match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) => (owner.to_string(), repo.to_string()),
            _ => return Err(SourceError::InvalidRepository(input.to_string())),
        };
        let subdir: Vec<&str> = segments.collect();

        Ok(Self {
            provider,
            owner,
            repo,
            subdir: (!subdir.is_empty()).then(|| subdir.join("/")),
            reference,
        })
    }
}

/// Where a template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// A directory on this machine; never modified or removed by a run
    Local(PathBuf),
    /// A repository fetched into a temporary staging directory
    Remote(RemoteRef),
}

impl TemplateSource {
    /// Classify a source string: `.`, `/`, or `~` prefixes are local paths,
    /// everything else is a repository reference.
    ///
    /// Relative local paths are resolved against `cwd`.
    pub fn resolve(input: &str, cwd: &Path) -> Result<Self, SourceError> {
        if is_local_path(input) {
            Ok(Self::Local(expand_path(input, cwd)?))
        } else {
            Ok(Self::Remote(input.parse()?))
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "(local) {}", path.display()),
            Self::Remote(remote) => write!(f, "{}", remote),
        }
    }
}

pub fn is_local_path(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/') || source.starts_with('~')
}

fn expand_path(source: &str, cwd: &Path) -> Result<PathBuf, SourceError> {
    if let Some(rest) = source.strip_prefix('~') {
        let home = dirs::home_dir().ok_or(SourceError::NoHomeDirectory)?;
        let rest = rest.trim_start_matches('/');
        return Ok(if rest.is_empty() { home } else { home.join(rest) });
    }
    Ok(cwd.join(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_prefixes() {
        let cwd = Path::new("/work");
        assert_eq!(
            TemplateSource::resolve("./tpl", cwd).unwrap(),
            TemplateSource::Local(PathBuf::from("/work/./tpl"))
        );
        assert_eq!(
            TemplateSource::resolve("/abs/tpl", cwd).unwrap(),
            TemplateSource::Local(PathBuf::from("/abs/tpl"))
        );
        assert!(TemplateSource::resolve("../sibling", cwd).unwrap().is_local());
    }

    #[test]
    fn test_home_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            TemplateSource::resolve("~/templates/web", Path::new("/work")).unwrap(),
            TemplateSource::Local(home.join("templates/web"))
        );
        assert_eq!(
            TemplateSource::resolve("~", Path::new("/work")).unwrap(),
            TemplateSource::Local(home)
        );
    }

    #[test]
    fn test_remote_defaults_to_github() {
        let source = TemplateSource::resolve("raptorthree/ash-stack", Path::new("/")).unwrap();
        let TemplateSource::Remote(remote) = source else {
            panic!("expected remote source");
        };
        assert_eq!(remote.provider, Provider::GitHub);
        assert_eq!(remote.owner, "raptorthree");
        assert_eq!(remote.repo, "ash-stack");
        assert_eq!(remote.subdir, None);
        assert_eq!(remote.git_ref(), "HEAD");
    }

    #[test]
    fn test_remote_with_provider_subdir_and_ref() {
        let remote: RemoteRef = "gitlab:group/project/templates/web#v2".parse().unwrap();
        assert_eq!(remote.provider, Provider::GitLab);
        assert_eq!(remote.owner, "group");
        assert_eq!(remote.repo, "project");
        assert_eq!(remote.subdir.as_deref(), Some("templates/web"));
        assert_eq!(remote.git_ref(), "v2");
        assert_eq!(remote.to_string(), "gitlab:group/project/templates/web#v2");
    }

    #[test]
    fn test_gh_alias() {
        let remote: RemoteRef = "gh:owner/repo".parse().unwrap();
        assert_eq!(remote.provider, Provider::GitHub);
    }

    #[test]
    fn test_invalid_remote_references() {
        assert_eq!(
            "svn:owner/repo".parse::<RemoteRef>(),
            Err(SourceError::UnknownProvider("svn".to_string()))
        );
        assert!(matches!(
            "just-a-name".parse::<RemoteRef>(),
            Err(SourceError::InvalidRepository(_))
        ));
    }
}
