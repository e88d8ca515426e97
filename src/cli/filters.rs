//! The `filters` command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::filters::FilterRegistry;

#[derive(Args, Debug)]
pub struct FiltersCommand {
    /// Print names only
    #[arg(short, long)]
    quiet: bool,
}

impl FiltersCommand {
    pub fn execute(self) -> Result<()> {
        let registry = FilterRegistry::with_builtins();
        for line in self.lines(&registry) {
            println!("{line}");
        }
        Ok(())
    }

    fn lines(&self, registry: &FilterRegistry) -> Vec<String> {
        registry
            .iter()
            .map(|filter| {
                if self.quiet {
                    filter.name().to_string()
                } else {
                    format!("{}{}", filter.name().bold(), filter.signature())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_sorted_by_name() {
        let cmd = FiltersCommand {
            quiet: true,
        };
        let lines = cmd.lines(&FilterRegistry::with_builtins());
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(lines.iter().any(|line| line == "upper"));
    }
}
