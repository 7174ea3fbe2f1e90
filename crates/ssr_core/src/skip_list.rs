//! Hydration skip lists.
//!
//! The server emits top-level `<head>` and `<body>` children the client tree
//! never produces (contributed metadata, the store script, preload and entry
//! scripts). The client must neither diff nor remove them, so it is told
//! their positions. Positions are pure index arithmetic over the document
//! template in [`crate::document`]; both must change together.
//!
//! Head layout:
//!
//! ```text
//! 0..3                        default metas              kept
//! 3..3+meta+link              contributed meta, link     skipped
//! next                        <title>                    kept
//! next style positions        contributed style blocks   skipped
//! next (if styles collected)  collected style block      skipped
//! ```
//!
//! Body layout:
//!
//! ```text
//! 0                   root mount node         kept
//! 1                   store script            skipped
//! next chunk count    preload scripts         skipped
//! next entry count    entry scripts           skipped
//! ```

use serde::{Deserialize, Serialize};

/// Default `<meta>` tags the template always emits first in `<head>`.
pub const DEFAULT_HEAD_META_COUNT: usize = 3;

/// Position of the root mount node in `<body>`.
pub const ROOT_NODE_POSITION: usize = 0;

/// Position of the serialized store script in `<body>`.
pub const STORE_SCRIPT_POSITION: usize = 1;

/// Contributed metadata entry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataCounts {
    pub meta: usize,
    pub link: usize,
    pub style: usize,
}

impl MetadataCounts {
    /// Position of `<title>` among the head children.
    pub fn title_position(&self) -> usize {
        DEFAULT_HEAD_META_COUNT + self.meta + self.link
    }
}

/// Document section a position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Head,
    Body,
}

/// Top-level child positions the client must leave alone, per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipList {
    #[serde(rename = "headSkip")]
    pub head: Vec<usize>,
    #[serde(rename = "bodySkip")]
    pub body: Vec<usize>,
}

impl SkipList {
    pub fn positions(&self, section: Section) -> &[usize] {
        match section {
            Section::Head => &self.head,
            Section::Body => &self.body,
        }
    }

    /// Whether the client must skip `position` in `section`.
    pub fn should_skip(&self, section: Section, position: usize) -> bool {
        self.positions(section).binary_search(&position).is_ok()
    }

    /// Positions among `child_count` server children the client reconciles.
    pub fn reconciled(&self, section: Section, child_count: usize) -> Vec<usize> {
        (0..child_count)
            .filter(|position| !self.should_skip(section, *position))
            .collect()
    }
}

/// Compute the skip list for one render.
///
/// `has_collected_styles` is true when server-side style collection produced
/// a block, which the template emits after the contributed styles.
pub fn compute_skip_list(
    counts: MetadataCounts,
    has_collected_styles: bool,
    chunk_count: usize,
    entry_count: usize,
) -> SkipList {
    let mut head = Vec::with_capacity(
        counts.meta + counts.link + counts.style + usize::from(has_collected_styles),
    );

    let mut idx = DEFAULT_HEAD_META_COUNT;
    head.extend(idx..idx + counts.meta + counts.link);
    // Contributed tags, then the title which the client reproduces.
    idx += counts.meta + counts.link + 1;
    head.extend(idx..idx + counts.style);
    idx += counts.style;
    if has_collected_styles {
        head.push(idx);
    }

    let mut body = Vec::with_capacity(1 + chunk_count + entry_count);
    let mut idx = STORE_SCRIPT_POSITION;
    body.push(idx);
    idx += 1;
    body.extend(idx..idx + chunk_count);
    idx += chunk_count;
    body.extend(idx..idx + entry_count);

    SkipList { head, body }
}
