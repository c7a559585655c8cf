//! Name selection as written in the config file.
//!
//! JSON shape, one of:
//! { "pattern": "swerve|navX.*Value|schedgen" }
//! { "names": ["/swerve/txout", "/schedgen"] }

use crate::model::Selection;
use anyhow::{Context, bail};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectSpec {
    /// Regular expression searched anywhere in the entry name.
    Pattern(String),
    /// Exact entry names.
    Names(Vec<String>),
}

impl SelectSpec {
    /// Compile into a [`Selection`]. Rejects bad patterns and empty name lists.
    pub fn compile(&self) -> anyhow::Result<Selection> {
        match self {
            SelectSpec::Pattern(p) => {
                let re = Regex::new(p).with_context(|| format!("invalid select pattern {:?}", p))?;
                Ok(Selection::Pattern(re))
            }
            SelectSpec::Names(names) => {
                let set: BTreeSet<String> = names
                    .iter()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
                    .collect();
                if set.is_empty() {
                    bail!("select names must contain at least one name");
                }
                Ok(Selection::ExactNames(set))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_shapes() {
        let p: SelectSpec = serde_json::from_str(r#"{"pattern": "a|b"}"#).unwrap();
        assert_eq!(p, SelectSpec::Pattern("a|b".to_string()));

        let n: SelectSpec = serde_json::from_str(r#"{"names": ["/a", "/b"]}"#).unwrap();
        assert_eq!(n, SelectSpec::Names(vec!["/a".to_string(), "/b".to_string()]));
    }

    #[test]
    fn compile_rejects_bad_input() {
        assert!(SelectSpec::Pattern("(".to_string()).compile().is_err());
        assert!(SelectSpec::Names(vec![" ".to_string()]).compile().is_err());
    }

    #[test]
    fn compiled_names_match_exactly() {
        let sel = SelectSpec::Names(vec!["/a".to_string()]).compile().unwrap();
        assert!(sel.matches("/a"));
        assert!(!sel.matches("/a/b"));
    }
}
