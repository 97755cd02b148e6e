//! Find and replace over the text nodes of a container.
//!
//! A [`FindReplace`] session owns its own state (search strings, computed
//! matches, selected index) and only talks to the document through
//! [`Document`] queries and edit commands. Matches remember the document
//! version they were computed at; replacing against stale matches is refused.

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::document::Document;
use crate::editing::{Cmd, insert_text};
use crate::error::EditError;
use crate::model::{ContainerId, PropertyPath, PropertySelection, Selection};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("No match selected")]
    NoMatchSelected,

    #[error("No match at index {index} ({len} matches)")]
    NoSuchMatch { index: usize, len: usize },

    #[error("Matches were computed at version {computed} but the document is at {current}")]
    Stale { computed: u64, current: u64 },

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// One occurrence of the search pattern
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub path: PropertyPath,
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub fn selection(&self, container_id: &ContainerId) -> Selection {
        Selection::Property(
            PropertySelection::range(self.path.clone(), self.start, self.end)
                .with_container(Some(container_id.clone())),
        )
    }
}

/// Matches in document order, tagged with the version they were found at
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSet {
    matches: Vec<Match>,
    version: u64,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// A find/replace session
#[derive(Clone, Debug)]
pub struct FindReplace {
    container_id: ContainerId,
    enabled: bool,
    find_string: String,
    replace_string: String,
    matches: MatchSet,
    selected: Option<usize>,
}

impl FindReplace {
    pub fn new(container_id: impl Into<ContainerId>) -> Self {
        Self {
            container_id: container_id.into(),
            enabled: false,
            find_string: String::new(),
            replace_string: String::new(),
            matches: MatchSet::default(),
            selected: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn find_string(&self) -> &str {
        &self.find_string
    }

    pub fn replace_string(&self) -> &str {
        &self.replace_string
    }

    pub fn set_replace_string(&mut self, replace: impl Into<String>) {
        self.replace_string = replace.into();
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.selected.and_then(|index| self.matches.get(index))
    }

    /// Selection covering the selected match
    pub fn selection(&self) -> Option<Selection> {
        self.selected_match()
            .map(|found| found.selection(&self.container_id))
    }

    /// Case-insensitive search over every text node shown in the container.
    ///
    /// A find string that is not a valid regex is searched for literally.
    pub fn compute_matches(&self, doc: &Document) -> Result<MatchSet, SearchError> {
        let mut matches = Vec::new();
        if !self.find_string.is_empty() {
            let pattern = build_pattern(&self.find_string)?;
            for (path, text) in doc.visible_text(&self.container_id) {
                matches.extend(
                    pattern
                        .find_iter(&text)
                        .filter(|found| found.start() < found.end())
                        .map(|found| Match {
                            path: path.clone(),
                            start: found.start(),
                            end: found.end(),
                        }),
                );
            }
        }
        Ok(MatchSet {
            matches,
            version: doc.version(),
        })
    }

    /// Start searching for `find`, selecting the first match at or after the
    /// document's caret
    pub fn start_find(
        &mut self,
        doc: &Document,
        find: impl Into<String>,
    ) -> Result<Option<&Match>, SearchError> {
        self.enabled = true;
        self.find_string = find.into();
        self.matches = self.compute_matches(doc)?;
        self.selected = match caret_key(doc, &self.container_id) {
            Some(caret) => self.first_at_or_after(doc, caret),
            None if self.matches.is_empty() => None,
            None => Some(0),
        };
        debug!(
            "Found {} matches for {:?}",
            self.matches.len(),
            self.find_string
        );
        Ok(self.selected_match())
    }

    /// Stop the session and forget its matches
    pub fn close(&mut self) {
        self.enabled = false;
        self.matches = MatchSet::default();
        self.selected = None;
    }

    pub fn is_stale(&self, doc: &Document) -> bool {
        self.matches.version != doc.version()
    }

    /// Recompute matches against the current document, keeping the selected
    /// index where possible
    pub fn refresh(&mut self, doc: &Document) -> Result<(), SearchError> {
        self.matches = self.compute_matches(doc)?;
        self.selected = match self.selected {
            _ if self.matches.is_empty() => None,
            Some(index) => Some(index.min(self.matches.len() - 1)),
            None => None,
        };
        Ok(())
    }

    pub fn select_match(&mut self, index: usize) -> Result<&Match, SearchError> {
        let len = self.matches.len();
        let found = self
            .matches
            .get(index)
            .ok_or(SearchError::NoSuchMatch { index, len })?;
        self.selected = Some(index);
        Ok(found)
    }

    /// Select the next match, wrapping around to the first
    pub fn find_next(&mut self) -> Option<&Match> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.selected = Some(self.selected.map_or(0, |index| (index + 1) % len));
        self.selected_match()
    }

    /// Select the previous match, wrapping around to the last
    pub fn find_previous(&mut self) -> Option<&Match> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.selected = Some(self.selected.map_or(len - 1, |index| (index + len - 1) % len));
        self.selected_match()
    }

    /// Type the replace string over the selected match, then select the next
    /// match after the replacement
    pub fn replace_next(&mut self, doc: &mut Document) -> Result<Option<&Match>, SearchError> {
        self.ensure_fresh(doc)?;
        let found = self
            .selected_match()
            .cloned()
            .ok_or(SearchError::NoMatchSelected)?;

        doc.apply(Cmd::InsertText {
            text: self.replace_string.clone(),
            selection: Some(found.selection(&self.container_id)),
        })?;

        self.matches = self.compute_matches(doc)?;
        let resume = node_key(doc, &self.container_id, &found.path)
            .map(|node| (node, found.start + self.replace_string.len()));
        self.selected = match resume {
            Some(resume) => self.first_at_or_after(doc, resume),
            None if self.matches.is_empty() => None,
            None => Some(0),
        };
        Ok(self.selected_match())
    }

    /// Replace every match in one transaction; returns how many were replaced
    pub fn replace_all(&mut self, doc: &mut Document) -> Result<usize, SearchError> {
        self.ensure_fresh(doc)?;
        if self.matches.is_empty() {
            return Ok(0);
        }
        let count = self.matches.len();
        let replace = self.replace_string.clone();
        let container_id = self.container_id.clone();
        let matches = &self.matches;

        doc.transaction(|tx| {
            for found in matches.iter().rev() {
                insert_text(tx, &found.selection(&container_id), &replace)?;
            }
            Ok(())
        })?;
        debug!("Replaced {count} matches of {:?}", self.find_string);

        self.matches = self.compute_matches(doc)?;
        self.selected = None;
        Ok(count)
    }

    fn ensure_fresh(&self, doc: &Document) -> Result<(), SearchError> {
        if self.is_stale(doc) {
            return Err(SearchError::Stale {
                computed: self.matches.version,
                current: doc.version(),
            });
        }
        Ok(())
    }

    /// Index of the first match at or after `(node position, offset)`,
    /// wrapping to the first match
    fn first_at_or_after(&self, doc: &Document, key: (usize, usize)) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let after = self.matches.iter().position(|found| {
            node_key(doc, &self.container_id, &found.path)
                .is_some_and(|node| (node, found.start) >= key)
        });
        Some(after.unwrap_or(0))
    }
}

fn build_pattern(find: &str) -> Result<Regex, regex::Error> {
    match RegexBuilder::new(find).case_insensitive(true).build() {
        Ok(pattern) => Ok(pattern),
        Err(err) => {
            debug!("Searching for {find:?} literally: {err}");
            RegexBuilder::new(&regex::escape(find))
                .case_insensitive(true)
                .build()
        }
    }
}

/// Position in the container of the node owning `path`
fn node_key(doc: &Document, container_id: &ContainerId, path: &PropertyPath) -> Option<usize> {
    let node_id = path.node_id()?;
    doc.container(container_id)?.position(&node_id)
}

fn caret_key(doc: &Document, container_id: &ContainerId) -> Option<(usize, usize)> {
    let range = doc.selection().text_range()?;
    let node = node_key(doc, container_id, &range.start.path)?;
    Some((node, range.start.offset))
}
