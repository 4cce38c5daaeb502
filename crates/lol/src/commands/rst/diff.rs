use clap::{Args, ValueEnum};
use itertools::Itertools;
use lol_rst::RstFile;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};
use std::{cmp::Ordering, fmt::Display, path::PathBuf};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Mode {
    #[default]
    Semantic,
    Full,
}

#[derive(Debug, Eq, PartialEq)]
enum Change {
    Added(String, String),
    Removed(String, String),
    Comparison(String, String, String),
    Context(Vec<String>),
    Modified(String, String, Vec<Change>, Vec<Change>),
}

impl Change {
    pub fn with_children(&mut self, children: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, vec, _) => {
                children.into_iter().for_each(|c| vec.push(c));
                vec.sort();
                Ok(())
            }
            _ => Err(miette!("tried to add children to an addition or removal")),
        }
    }

    pub fn with_related(&mut self, related: Vec<Change>) -> Result<()> {
        match self {
            Change::Modified(_, _, _, vec) => {
                related.into_iter().for_each(|c| vec.push(c));
                vec.sort();
                Ok(())
            }
            _ => Err(miette!("tried to add related to an addition or removal")),
        }
    }
}

impl Ord for Change {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

#[allow(clippy::non_canonical_partial_ord_impl)]
impl PartialOrd for Change {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Change::Added(key, value), Change::Added(other_key, other_value))
            | (Change::Removed(key, value), Change::Removed(other_key, other_value)) => {
                Some(key.cmp(other_key).then(value.cmp(other_value)))
            }
            (Change::Comparison(key, _, _), Change::Comparison(other_key, _, _)) => {
                Some(key.cmp(other_key))
            }
            (
                Change::Modified(key, value, children, _),
                Change::Modified(other_key, other_value, other_children, _),
            ) => key.partial_cmp(other_key).and_then(|ord| {
                children
                    .partial_cmp(other_children)
                    .map(|ord_children| ord.then(value.cmp(other_value)).then(ord_children))
            }),
            _ => None,
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(_, v) => {
                writeln!(f, "✅ {}", v.green())
            }
            Change::Removed(_, v) => {
                writeln!(f, "❌ {}", v.red())
            }
            Change::Comparison(key, old, new) => {
                writeln!(f, "* {}: {} vs {}", key, old.red(), new.green())
            }
            Change::Context(values) => {
                writeln!(f, "{}", values.iter().map(|l| format!(" {}", l)).join("\n"))
            }
            Change::Modified(_, v, children, related) => {
                let mut txt_final = related.iter().map(|c| format!("{}", c)).join("");

                let mut section = String::new();
                let mut current_key = String::new();
                for c in children {
                    let key = match c {
                        Change::Added(key, _) => format!("* {} added:\n", key),
                        Change::Removed(key, _) => format!("* {} removed:\n", key),
                        Change::Modified(key, _, _, _) => format!("* {} modified:\n", key),
                        _ => current_key.clone(),
                    };

                    if current_key != key {
                        if !section.is_empty() {
                            txt_final.push_str(
                                &section.split("\n").map(|l| "  ".to_string() + l).join("\n"),
                            );
                            txt_final.push('\n');
                        }
                        section.clear();

                        txt_final.push_str(&key);
                        current_key = key
                    }

                    section.push_str(&format!("{}\n", c));
                }

                txt_final.push_str(&section.split("\n").map(|l| "  ".to_string() + l).join("\n"));

                writeln!(f, "🔃 {}", v.blue())?;
                writeln!(
                    f,
                    "{}",
                    txt_final
                        .split("\n")
                        .filter(|l| l.trim().len() > 1)
                        .map(|l| "  ".to_string() + l)
                        .join("\n")
                )
            }
        }
    }
}

fn entry_label(hash: u64, text: &str) -> String {
    format!("{:#012x} {:?}", hash, text)
}

#[derive(Args)]
pub struct DiffArgs {
    /// An input RST file
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input RST file
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Comparison mode
    #[arg(short, long, value_enum, default_value_t=Mode::Semantic)]
    mode: Mode,

    /// Replace invalid UTF-8 in texts instead of failing
    #[arg(long, default_value_t = false)]
    lossy: bool,
}

impl DiffArgs {
    fn inline_changes(&self, old: &str, new: &str) -> Vec<String> {
        let mut comparison = Vec::new();
        if self.mode != Mode::Full {
            return comparison;
        }

        let diff = TextDiff::from_chars(old, new);
        for op in diff.ops().iter() {
            for change in diff.iter_inline_changes(op) {
                let mut context = String::new();
                for (emphasized, value) in change.iter_strings_lossy() {
                    if emphasized {
                        if change.tag() == ChangeTag::Insert {
                            context.push_str(&format!("{}", value.green().underline()));
                        } else {
                            context.push_str(&format!("{}", value.red().underline()));
                        }
                    } else {
                        context.push_str(&format!("{}", value.dimmed()));
                    }
                }
                comparison.push(context);
            }
        }
        comparison
    }

    fn handle_entries(&self, left: &RstFile, right: &RstFile) -> Vec<Change> {
        let mut result = Vec::new();

        // Find Added Entries
        right
            .iter()
            .filter(|(k, _)| !left.contains_key(*k))
            .map(|(k, v)| Change::Added("entries".into(), entry_label(*k, v)))
            .for_each(|c| result.push(c));

        // Find Removed Entries
        left.iter()
            .filter(|(k, _)| !right.contains_key(*k))
            .map(|(k, v)| Change::Removed("entries".into(), entry_label(*k, v)))
            .for_each(|c| result.push(c));

        // Find Differences
        left.iter()
            .filter_map(|(k, old)| right.get(k).map(|new| (k, old, new)))
            .filter(|(_, old, new)| old != new)
            .sorted_by_key(|(k, _, _)| **k)
            .map(|(k, old, new)| {
                Change::Modified(
                    "entries".into(),
                    format!("{:#012x}", k),
                    vec![],
                    vec![
                        Change::Comparison("text".into(), format!("{:?}", old), format!("{:?}", new)),
                        Change::Context(self.inline_changes(old, new)),
                    ],
                )
            })
            .for_each(|c| result.push(c));

        result
    }

    fn handle_rst(&self, name: &str, left: &RstFile, right: &RstFile) -> Result<Option<Change>> {
        let mut result: Option<Change> = None;

        let mut related = Vec::new();
        if left.version() != right.version() {
            related.push(Change::Comparison(
                "version".into(),
                left.version().to_string(),
                right.version().to_string(),
            ));
        }

        if left.mode() != right.mode() {
            related.push(Change::Comparison(
                "mode".into(),
                left.mode().to_string(),
                right.mode().to_string(),
            ));
        }

        if left.config() != right.config() {
            related.push(Change::Comparison(
                "config".into(),
                format!("{:?}", left.config().unwrap_or_default()),
                format!("{:?}", right.config().unwrap_or_default()),
            ));
        }

        if left.len() != right.len() {
            related.push(Change::Comparison(
                "entries".into(),
                left.len().to_string(),
                right.len().to_string(),
            ));
        }

        if !related.is_empty() {
            result
                .get_or_insert(Change::Modified("rst".into(), name.into(), Vec::new(), Vec::new()))
                .with_related(related)?;
        }

        let changes = self.handle_entries(left, right);
        if !changes.is_empty() {
            result
                .get_or_insert(Change::Modified("rst".into(), name.into(), Vec::new(), Vec::new()))
                .with_children(changes)?;
        }

        Ok(result)
    }

    pub fn handle(&self) -> Result<()> {
        let left = super::open_rst(&self.left, self.lossy)?;
        let right = super::open_rst(&self.right, self.lossy)?;

        let difference = self.handle_rst(&self.left.to_string_lossy(), &left, &right)?;

        if let Some(d) = difference {
            println!("{}", d);
        }

        Ok(())
    }
}
