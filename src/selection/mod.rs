//! Generic multi-select controller shared by every "pick students / pick
//! batches" flow.
//!
//! The controller keeps two sets: the owner value (what the calling flow last
//! handed in or committed) and the working selection being edited. Both are
//! always subsets of the candidate ids.

pub mod prompt;

use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Something that can be listed, searched and selected by id.
pub trait Candidate {
    fn id(&self) -> &str;

    /// Text fields matched by the free-text filter.
    fn search_fields(&self) -> Vec<&str>;

    /// Primary text shown in a row.
    fn label(&self) -> String;

    /// Secondary text shown dimmed after the label.
    fn detail(&self) -> Option<String> {
        None
    }
}

/// Case-insensitive substring match on any search field. A blank query matches
/// everything.
pub fn matches<C: Candidate + ?Sized>(candidate: &C, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    candidate
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub selected: usize,
    pub total: usize,
    pub visible: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} selected", self.selected, self.total)?;
        if self.visible != self.total {
            write!(f, " ({} shown)", self.visible)?;
        }
        Ok(())
    }
}

pub struct SelectionController<C> {
    candidates: Vec<C>,
    valid_ids: HashSet<String>,
    owner: BTreeSet<String>,
    working: BTreeSet<String>,
    query: String,
}

impl<C: Candidate> SelectionController<C> {
    /// Ids in `initial` that are not candidates are dropped.
    pub fn open<I, S>(candidates: Vec<C>, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let valid_ids: HashSet<String> = candidates.iter().map(|c| c.id().to_string()).collect();
        let mut dropped = 0usize;
        let owner: BTreeSet<String> = initial
            .into_iter()
            .map(Into::into)
            .filter(|id| {
                let known = valid_ids.contains(id);
                if !known {
                    dropped += 1;
                }
                known
            })
            .collect();

        if dropped > 0 {
            tracing::debug!(dropped, "Ignoring initial selections that are not candidates");
        }

        Self {
            candidates,
            valid_ids,
            working: owner.clone(),
            owner,
            query: String::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_filter(&mut self) {
        self.query.clear();
    }

    /// Candidates matching the current filter, in source order.
    pub fn filtered(&self) -> Vec<&C> {
        self.candidates
            .iter()
            .filter(|c| matches(*c, &self.query))
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.working.contains(id)
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.working
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.owner
    }

    /// Flip one id. Returns `false` (and changes nothing) for unknown ids.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.valid_ids.contains(id) {
            tracing::debug!(id, "Refusing to toggle unknown candidate");
            return false;
        }
        if !self.working.remove(id) {
            self.working.insert(id.to_string());
        }
        true
    }

    /// Select exactly the filtered subset, or deselect it if it is already fully
    /// selected. Rows hidden by the filter keep their membership. Returns whether
    /// the filtered subset is selected afterwards.
    pub fn toggle_all_filtered(&mut self) -> bool {
        let visible: Vec<String> = self
            .filtered()
            .into_iter()
            .map(|c| c.id().to_string())
            .collect();
        if visible.is_empty() {
            return false;
        }

        let all_selected = visible.iter().all(|id| self.working.contains(id));
        if all_selected {
            for id in &visible {
                self.working.remove(id);
            }
            false
        } else {
            self.working.extend(visible);
            true
        }
    }

    /// Accept the working selection as the new owner value.
    pub fn commit(&mut self) -> Vec<String> {
        self.owner = self.working.clone();
        self.working.iter().cloned().collect()
    }

    /// Throw away edits since open or the last commit.
    pub fn cancel(&mut self) {
        self.working = self.owner.clone();
    }

    pub fn summary(&self) -> Summary {
        Summary {
            selected: self.working.len(),
            total: self.candidates.len(),
            visible: self.filtered().len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    pub(crate) struct Item {
        pub id: String,
        pub name: String,
        pub email: String,
    }

    impl Candidate for Item {
        fn id(&self) -> &str {
            &self.id
        }

        fn search_fields(&self) -> Vec<&str> {
            vec![self.name.as_str(), self.email.as_str()]
        }

        fn label(&self) -> String {
            self.name.clone()
        }

        fn detail(&self) -> Option<String> {
            Some(self.email.clone())
        }
    }

    pub(crate) fn roster() -> Vec<Item> {
        [
            ("1", "Ada Lovelace", "ada@school.org"),
            ("2", "Alan Turing", "alan@school.org"),
            ("3", "Grace Hopper", "grace@navy.mil"),
            ("4", "Edsger Dijkstra", "ewd@school.org"),
        ]
        .into_iter()
        .map(|(id, name, email)| Item {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        })
        .collect()
    }

    fn ids(c: &SelectionController<Item>) -> Vec<&str> {
        c.selected().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_over_all_fields() {
        let mut c = SelectionController::open(roster(), Vec::<String>::new());

        c.set_filter("LA");
        let names: Vec<_> = c.filtered().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Alan Turing"]);

        c.set_filter("navy");
        assert_eq!(c.filtered().len(), 1);

        c.set_filter("   ");
        assert_eq!(c.filtered().len(), 4);
        assert_eq!(c.summary().total, 4);
    }

    #[test]
    fn test_unknown_initial_ids_are_dropped() {
        let c = SelectionController::open(roster(), ["2", "99"]);
        assert_eq!(ids(&c), vec!["2"]);
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut c = SelectionController::open(roster(), ["1"]);

        assert!(c.toggle("3"));
        assert!(c.is_selected("3"));
        assert!(c.toggle("3"));
        assert_eq!(ids(&c), vec!["1"]);

        assert!(!c.toggle("nope"));
        assert_eq!(ids(&c), vec!["1"]);
    }

    #[test]
    fn test_select_all_only_touches_filtered_rows() {
        let mut c = SelectionController::open(roster(), ["3"]);
        c.set_filter("school.org");

        assert!(c.toggle_all_filtered());
        assert_eq!(ids(&c), vec!["1", "2", "3", "4"]);

        assert!(!c.toggle_all_filtered());
        assert_eq!(ids(&c), vec!["3"]);
    }

    #[test]
    fn test_select_all_with_partial_selection_selects_rest() {
        let mut c = SelectionController::open(roster(), ["1"]);
        c.set_filter("a");

        assert!(c.toggle_all_filtered());
        let visible: Vec<_> = c.filtered().iter().map(|i| i.id.clone()).collect();
        assert!(visible.iter().all(|id| c.is_selected(id)));
    }

    #[test]
    fn test_select_all_on_empty_view_is_noop() {
        let mut c = SelectionController::open(roster(), ["1"]);
        c.set_filter("zzz");

        assert!(!c.toggle_all_filtered());
        assert_eq!(ids(&c), vec!["1"]);
    }

    #[test]
    fn test_cancel_restores_owner_value() {
        let mut c = SelectionController::open(roster(), ["1", "2"]);
        c.toggle("1");
        c.toggle("4");
        c.toggle_all_filtered();
        assert!(c.is_dirty());

        c.cancel();
        assert_eq!(ids(&c), vec!["1", "2"]);
        assert!(!c.is_dirty());
    }

    #[test]
    fn test_commit_becomes_new_owner_value() {
        let mut c = SelectionController::open(roster(), ["1"]);
        c.toggle("4");
        assert_eq!(c.commit(), vec!["1".to_string(), "4".to_string()]);

        c.toggle("1");
        c.cancel();
        assert_eq!(ids(&c), vec!["1", "4"]);
    }

    #[test]
    fn test_summary() {
        let mut c = SelectionController::open(roster(), ["1", "2"]);
        assert_eq!(c.summary().to_string(), "2 of 4 selected");

        c.set_filter("grace");
        assert_eq!(
            c.summary(),
            Summary {
                selected: 2,
                total: 4,
                visible: 1
            }
        );
        assert_eq!(c.summary().to_string(), "2 of 4 selected (1 shown)");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn op() -> impl Strategy<Value = (u8, usize, String)> {
            (0u8..3, 0usize..6, "[a-zA-Z@. ]{0,4}")
        }

        proptest! {
            #[test]
            fn filtered_is_matching_subset(query in "[a-zA-Z@. ]{0,6}") {
                let mut c = SelectionController::open(roster(), Vec::<String>::new());
                c.set_filter(query.clone());
                let needle = query.trim().to_lowercase();

                for item in c.filtered() {
                    prop_assert!(
                        needle.is_empty()
                            || item.name.to_lowercase().contains(&needle)
                            || item.email.to_lowercase().contains(&needle)
                    );
                }
                let expected = roster().iter().filter(|i| matches(*i, &query)).count();
                prop_assert_eq!(c.filtered().len(), expected);
                prop_assert_eq!(c.summary().total, 4);
            }

            #[test]
            fn select_all_then_again_is_exact(query in "[a-zA-Z@. ]{0,4}", initial in proptest::collection::vec(1u8..5, 0..4)) {
                let initial: Vec<String> = initial.iter().map(|n| n.to_string()).collect();
                let mut c = SelectionController::open(roster(), initial.clone());
                c.set_filter(query);
                let visible: BTreeSet<String> = c.filtered().iter().map(|i| i.id.clone()).collect();
                let hidden_before: BTreeSet<String> =
                    c.selected().difference(&visible).cloned().collect();

                c.toggle_all_filtered();
                // Filtered rows end up all selected, or (if they already were) all deselected.
                let after_first: BTreeSet<String> = c.selected().intersection(&visible).cloned().collect();
                prop_assert!(after_first.is_empty() || after_first == visible);

                if after_first == visible && !visible.is_empty() {
                    c.toggle_all_filtered();
                    prop_assert!(c.selected().intersection(&visible).next().is_none());
                }
                let hidden_after: BTreeSet<String> = c.selected().difference(&visible).cloned().collect();
                prop_assert_eq!(hidden_before, hidden_after);
            }

            #[test]
            fn cancel_after_any_edits_restores(ops in proptest::collection::vec(op(), 0..20)) {
                let mut c = SelectionController::open(roster(), ["2", "3"]);
                for (kind, index, query) in ops {
                    match kind {
                        0 => { c.toggle(&index.to_string()); }
                        1 => { c.toggle_all_filtered(); }
                        _ => c.set_filter(query),
                    }
                    let valid: BTreeSet<String> = roster().iter().map(|i| i.id.clone()).collect();
                    prop_assert!(c.selected().is_subset(&valid));
                }
                c.cancel();
                prop_assert_eq!(ids(&c), vec!["2", "3"]);
            }
        }
    }
}
