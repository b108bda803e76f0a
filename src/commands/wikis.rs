//! Built-in wiki list

use crate::config::FANDOMS;

pub fn render() -> String {
    FANDOMS
        .iter()
        .map(|(name, url)| format!("- {}: {}", name, url))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run() {
    println!("Built-in wikis:\n{}", render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_builtin_wiki() {
        let out = render();
        assert_eq!(out.lines().count(), FANDOMS.len());
        assert!(out.starts_with("- Bee Swarm Simulator: https://"));
    }
}
