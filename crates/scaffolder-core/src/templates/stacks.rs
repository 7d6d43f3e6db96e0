//! Curated stacks - named shortcuts for well-known template repositories

/// A curated template repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stack {
    pub name: &'static str,
    pub description: &'static str,
    /// Repository reference in `owner/repo` form
    pub repo: &'static str,
}

/// Built-in stacks; add new entries here
pub const STACKS: &[Stack] = &[Stack {
    name: "ash-stack",
    description: "Rails 8 + Inertia.js + Vue 3 + Vite",
    repo: "raptorthree/ash-stack",
}];

pub fn find_stack(name: &str) -> Option<&'static Stack> {
    STACKS.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::source::RemoteRef;

    #[test]
    fn test_find_stack() {
        let stack = find_stack("ash-stack").unwrap();
        assert_eq!(stack.repo, "raptorthree/ash-stack");
        assert!(find_stack("missing-stack").is_none());
    }

    #[test]
    fn test_stack_repos_are_valid_references() {
        for stack in STACKS {
            assert!(stack.repo.parse::<RemoteRef>().is_ok(), "{}", stack.name);
        }
    }
}
