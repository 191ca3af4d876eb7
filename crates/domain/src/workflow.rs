//! Selection workflow
//!
//! State machine behind the exercise picker of the workout creation. The workflow owns the
//! fetched catalog page, the filter and the selection. It performs no I/O itself: every
//! transition that needs catalog data hands out a [`FetchRequest`], and the outcome of the fetch
//! is fed back with [`SelectionWorkflow::resolve`]. Only the outcome of the latest request is
//! applied, so a slow response can never overwrite the result of a newer request.

use log::debug;

use crate::{
    CatalogPage, Exercise, ExerciseFilter, ExerciseID, FetchError, MuscleGroup, MuscleGroupID,
    Page, SelectionSet,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Loading,
    Error { reason: FetchError },
    /// The catalog contains neither exercises nor muscle groups.
    Empty,
    Browsing,
    Committed,
    Cancelled,
}

impl WorkflowState {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, WorkflowState::Committed | WorkflowState::Cancelled)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub page: Page,
    pub with_muscle_groups: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCatalog {
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug)]
pub struct SelectionWorkflow {
    state: WorkflowState,
    catalog: CatalogPage,
    muscle_groups_loaded: bool,
    requested_page: Page,
    filter: ExerciseFilter,
    selection: SelectionSet,
    last_ticket: Ticket,
    pending: Option<FetchRequest>,
}

impl Default for SelectionWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Loading,
            catalog: CatalogPage::default(),
            muscle_groups_loaded: false,
            requested_page: Page::FIRST,
            filter: ExerciseFilter::default(),
            selection: SelectionSet::new(),
            last_ticket: Ticket::default(),
            pending: None,
        }
    }

    /// Requests the muscle groups and the first page of exercises.
    pub fn start(&mut self) -> Option<FetchRequest> {
        if self.state != WorkflowState::Loading {
            return None;
        }
        Some(self.request(self.requested_page, true))
    }

    pub fn retry(&mut self) -> Option<FetchRequest> {
        if !matches!(
            self.state,
            WorkflowState::Error { .. } | WorkflowState::Empty
        ) {
            return None;
        }
        self.state = WorkflowState::Loading;
        Some(self.request(self.requested_page, !self.muscle_groups_loaded))
    }

    pub fn change_page(&mut self, page: Page) -> Option<FetchRequest> {
        if self.state != WorkflowState::Browsing {
            return None;
        }
        self.requested_page = page;
        Some(self.request(page, false))
    }

    /// Applies the outcome of a fetch.
    ///
    /// Returns `false` if the request was superseded by a newer one or the workflow has already
    /// finished. In that case the workflow is left unchanged.
    pub fn resolve(
        &mut self,
        request: &FetchRequest,
        result: Result<FetchedCatalog, FetchError>,
    ) -> bool {
        if self.state.is_finished()
            || self.pending.as_ref().map(|p| p.ticket) != Some(request.ticket)
        {
            debug!("discarding outdated response for page {}", request.page);
            return false;
        }

        self.pending = None;

        match result {
            Ok(fetched) => {
                if let Some(muscle_groups) = fetched.muscle_groups {
                    self.catalog.muscle_groups = muscle_groups;
                }
                self.catalog.page = request.page;
                self.catalog.exercises = fetched.exercises;

                if request.with_muscle_groups && self.catalog.is_empty() {
                    self.state = WorkflowState::Empty;
                } else {
                    self.muscle_groups_loaded |= request.with_muscle_groups;
                    self.state = WorkflowState::Browsing;
                }
            }
            Err(reason) => {
                self.state = WorkflowState::Error { reason };
            }
        }

        true
    }

    /// Forgets a request whose fetch was dropped before it resolved.
    ///
    /// Returns `false` if the request is not the pending one.
    pub fn abandon(&mut self, request: &FetchRequest) -> bool {
        if self.pending.as_ref().map(|p| p.ticket) != Some(request.ticket) {
            return false;
        }
        debug!("abandoned fetch of page {}", request.page);
        self.pending = None;
        true
    }

    pub fn set_filter(&mut self, filter: ExerciseFilter) {
        if !self.state.is_finished() {
            self.filter = filter;
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.set_filter(self.filter.with_name(name));
    }

    pub fn toggle_muscle_group(&mut self, muscle_group: &MuscleGroupID) {
        self.set_filter(self.filter.with_muscle_group_toggled(muscle_group));
    }

    /// Adds the exercise to or removes it from the selection.
    ///
    /// Ignored unless the workflow is browsing the catalog.
    pub fn toggle(&mut self, exercise: &Exercise) {
        if self.state == WorkflowState::Browsing {
            self.selection.toggle(exercise);
        }
    }

    /// Finishes the workflow and returns the selected exercises in selection order.
    pub fn commit(&mut self) -> Option<Vec<Exercise>> {
        if self.state != WorkflowState::Browsing {
            return None;
        }
        self.state = WorkflowState::Committed;
        self.pending = None;
        Some(self.selection.members().to_vec())
    }

    pub fn cancel(&mut self) {
        if self.state.is_finished() {
            return;
        }
        self.state = WorkflowState::Cancelled;
        self.pending = None;
        self.filter = ExerciseFilter::default();
        self.selection = SelectionSet::new();
    }

    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogPage {
        &self.catalog
    }

    #[must_use]
    pub fn requested_page(&self) -> Page {
        self.requested_page
    }

    #[must_use]
    pub fn filter(&self) -> &ExerciseFilter {
        &self.filter
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn visible_exercises(&self) -> Vec<&Exercise> {
        if self.state != WorkflowState::Browsing {
            return vec![];
        }
        self.filter.exercises(&self.catalog.exercises)
    }

    /// Visible exercises together with their position in the selection.
    #[must_use]
    pub fn entries(&self) -> Vec<(&Exercise, Option<usize>)> {
        self.visible_exercises()
            .into_iter()
            .map(|e| (e, self.selection.position_of(&e.id)))
            .collect()
    }

    #[must_use]
    pub fn position_of(&self, id: &ExerciseID) -> Option<usize> {
        self.selection.position_of(id)
    }

    fn request(&mut self, page: Page, with_muscle_groups: bool) -> FetchRequest {
        self.last_ticket = Ticket(self.last_ticket.0 + 1);
        let request = FetchRequest {
            ticket: self.last_ticket,
            page,
            with_muscle_groups,
        };
        self.pending = Some(request.clone());
        request
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::tests::data::{
        BENCH_PRESS, DIPS, EXERCISES, EXERCISES_2, LEGS, MUSCLE_GROUPS, SQUAT,
    };

    use super::*;

    fn page(number: u32) -> Page {
        Page::new(number).unwrap()
    }

    fn initial_catalog() -> FetchedCatalog {
        FetchedCatalog {
            muscle_groups: Some(MUSCLE_GROUPS.clone()),
            exercises: EXERCISES.clone(),
        }
    }

    fn second_page() -> FetchedCatalog {
        FetchedCatalog {
            muscle_groups: None,
            exercises: EXERCISES_2.clone(),
        }
    }

    fn server_error() -> FetchError {
        FetchError::Server {
            message: "Try again later".to_string(),
        }
    }

    fn browsing() -> SelectionWorkflow {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();
        assert!(workflow.resolve(&request, Ok(initial_catalog())));
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        workflow
    }

    fn visible_ids(workflow: &SelectionWorkflow) -> Vec<String> {
        workflow
            .visible_exercises()
            .iter()
            .map(|e| e.id.to_string())
            .collect()
    }

    #[test]
    fn test_start() {
        let mut workflow = SelectionWorkflow::new();

        assert_eq!(workflow.state(), &WorkflowState::Loading);

        let request = workflow.start().unwrap();

        assert_eq!(request.page, Page::FIRST);
        assert!(request.with_muscle_groups);
        assert!(workflow.is_fetching());
        assert!(workflow.visible_exercises().is_empty());

        assert!(workflow.resolve(&request, Ok(initial_catalog())));

        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        assert!(!workflow.is_fetching());
        assert_eq!(workflow.catalog().muscle_groups, *MUSCLE_GROUPS);
        assert_eq!(visible_ids(&workflow), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_start_only_while_loading() {
        let mut workflow = browsing();

        assert_eq!(workflow.start(), None);
    }

    #[test]
    fn test_start_error_and_retry() {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();

        assert!(workflow.resolve(&request, Err(FetchError::Network)));
        assert_eq!(
            workflow.state(),
            &WorkflowState::Error {
                reason: FetchError::Network
            }
        );

        let retry = workflow.retry().unwrap();

        assert_eq!(workflow.state(), &WorkflowState::Loading);
        assert!(retry.with_muscle_groups);
        assert!(retry.ticket > request.ticket);

        assert!(workflow.resolve(&retry, Ok(initial_catalog())));
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
    }

    #[test]
    fn test_retry_only_after_failure() {
        let mut workflow = SelectionWorkflow::new();

        assert_eq!(workflow.retry(), None);
        assert_eq!(browsing().retry(), None);
    }

    #[test]
    fn test_empty_catalog() {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();

        assert!(workflow.resolve(
            &request,
            Ok(FetchedCatalog {
                muscle_groups: Some(vec![]),
                exercises: vec![],
            })
        ));
        assert_eq!(workflow.state(), &WorkflowState::Empty);

        workflow.toggle(&SQUAT);
        assert!(workflow.selection().is_empty());

        let retry = workflow.retry().unwrap();

        assert!(retry.with_muscle_groups);
        assert!(workflow.resolve(&retry, Ok(initial_catalog())));
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
    }

    #[test]
    fn test_empty_page_is_not_an_empty_catalog() {
        let mut workflow = browsing();
        let request = workflow.change_page(page(9)).unwrap();

        assert!(workflow.resolve(
            &request,
            Ok(FetchedCatalog {
                muscle_groups: None,
                exercises: vec![],
            })
        ));
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        assert!(workflow.visible_exercises().is_empty());
    }

    #[test]
    fn test_toggle_ignored_while_loading_or_failed() {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();

        workflow.toggle(&SQUAT);
        assert!(workflow.selection().is_empty());

        workflow.resolve(&request, Err(server_error()));
        workflow.toggle(&SQUAT);
        assert!(workflow.selection().is_empty());
    }

    #[test]
    fn test_toggle_and_positions() {
        let mut workflow = browsing();

        workflow.toggle(&BENCH_PRESS);
        workflow.toggle(&SQUAT);
        workflow.toggle(&BENCH_PRESS);

        assert_eq!(workflow.selection().members(), [SQUAT.clone()]);
        assert_eq!(workflow.position_of(&SQUAT.id), Some(1));
        assert_eq!(
            workflow
                .entries()
                .into_iter()
                .map(|(e, position)| (e.id.to_string(), position))
                .collect::<Vec<_>>(),
            vec![
                ("1".to_string(), None),
                ("2".to_string(), Some(1)),
                ("3".to_string(), None),
                ("4".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_filter_change_keeps_selection() {
        let mut workflow = browsing();
        workflow.toggle(&DIPS);

        workflow.set_name("Squ");

        assert_eq!(visible_ids(&workflow), ["2", "3"]);
        assert_eq!(workflow.selection().members(), [DIPS.clone()]);

        workflow.toggle_muscle_group(&"chest".into());

        assert_eq!(visible_ids(&workflow), ["1", "2", "3", "4"]);

        workflow.set_name("");
        workflow.toggle_muscle_group(&"chest".into());
        workflow.toggle_muscle_group(&LEGS.into());

        assert_eq!(visible_ids(&workflow), ["2", "3"]);
        assert_eq!(workflow.selection().members(), [DIPS.clone()]);
    }

    #[test]
    fn test_set_filter_replaces_filter() {
        let mut workflow = browsing();
        let filter = ExerciseFilter::default().with_name("Bench");

        workflow.set_filter(filter.clone());

        assert_eq!(workflow.filter(), &filter);
        assert_eq!(visible_ids(&workflow), ["1"]);
    }

    #[test]
    fn test_change_page_keeps_selection_and_filter() {
        let mut workflow = browsing();
        workflow.toggle(&SQUAT);
        workflow.set_name("Pull");

        let request = workflow.change_page(page(2)).unwrap();

        assert!(!request.with_muscle_groups);
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        assert_eq!(workflow.requested_page(), page(2));
        assert_eq!(workflow.catalog().page, Page::FIRST);

        assert!(workflow.resolve(&request, Ok(second_page())));

        assert_eq!(workflow.catalog().page, page(2));
        assert_eq!(workflow.catalog().muscle_groups, *MUSCLE_GROUPS);
        assert_eq!(visible_ids(&workflow), ["6"]);
        assert_eq!(workflow.selection().members(), [SQUAT.clone()]);
        assert_eq!(workflow.position_of(&SQUAT.id), Some(1));
    }

    #[test]
    fn test_change_page_superseded_response_is_discarded() {
        let mut workflow = browsing();

        let request_2 = workflow.change_page(page(2)).unwrap();
        let request_3 = workflow.change_page(page(3)).unwrap();

        assert!(!workflow.resolve(&request_2, Ok(second_page())));
        assert_eq!(workflow.catalog().page, Page::FIRST);
        assert_eq!(visible_ids(&workflow), ["1", "2", "3", "4"]);
        assert!(workflow.is_fetching());

        assert!(workflow.resolve(
            &request_3,
            Ok(FetchedCatalog {
                muscle_groups: None,
                exercises: vec![DIPS.clone()],
            })
        ));
        assert_eq!(workflow.catalog().page, page(3));
        assert_eq!(visible_ids(&workflow), ["4"]);
    }

    #[test]
    fn test_change_page_late_response_is_discarded() {
        let mut workflow = browsing();

        let request_2 = workflow.change_page(page(2)).unwrap();
        let request_3 = workflow.change_page(page(3)).unwrap();

        assert!(workflow.resolve(
            &request_3,
            Ok(FetchedCatalog {
                muscle_groups: None,
                exercises: vec![DIPS.clone()],
            })
        ));
        assert!(!workflow.resolve(&request_2, Ok(second_page())));

        assert_eq!(workflow.catalog().page, page(3));
        assert_eq!(visible_ids(&workflow), ["4"]);
    }

    #[test]
    fn test_abandon_pending_request() {
        let mut workflow = browsing();

        let request_2 = workflow.change_page(page(2)).unwrap();
        let request_3 = workflow.change_page(page(3)).unwrap();

        assert!(!workflow.abandon(&request_2));
        assert!(workflow.is_fetching());

        assert!(workflow.abandon(&request_3));
        assert!(!workflow.is_fetching());
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        assert_eq!(workflow.catalog().page, Page::FIRST);

        assert!(!workflow.resolve(&request_3, Ok(second_page())));
        assert_eq!(workflow.catalog().page, Page::FIRST);
    }

    #[test]
    fn test_change_page_error_preserves_selection() {
        let mut workflow = browsing();
        workflow.toggle(&BENCH_PRESS);
        workflow.toggle(&SQUAT);
        let selection = workflow.selection().clone();

        let request = workflow.change_page(page(2)).unwrap();

        assert!(workflow.resolve(&request, Err(server_error())));
        assert_eq!(
            workflow.state(),
            &WorkflowState::Error {
                reason: server_error()
            }
        );
        assert_eq!(workflow.selection(), &selection);
        assert_eq!(workflow.catalog().page, Page::FIRST);
        assert_eq!(workflow.catalog().exercises, *EXERCISES);

        let retry = workflow.retry().unwrap();

        assert_eq!(retry.page, page(2));
        assert!(!retry.with_muscle_groups);
        assert!(workflow.resolve(&retry, Ok(second_page())));
        assert_eq!(workflow.state(), &WorkflowState::Browsing);
        assert_eq!(workflow.selection(), &selection);
    }

    #[test]
    fn test_response_is_applied_only_once() {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();

        assert!(workflow.resolve(&request, Err(FetchError::Network)));
        assert!(!workflow.resolve(&request, Ok(initial_catalog())));
        assert_eq!(
            workflow.state(),
            &WorkflowState::Error {
                reason: FetchError::Network
            }
        );
    }

    #[test]
    fn test_commit() {
        let mut workflow = browsing();
        workflow.toggle(&DIPS);
        workflow.toggle(&BENCH_PRESS);

        assert_eq!(
            workflow.commit(),
            Some(vec![DIPS.clone(), BENCH_PRESS.clone()])
        );
        assert_eq!(workflow.state(), &WorkflowState::Committed);

        workflow.toggle(&SQUAT);
        workflow.cancel();

        assert_eq!(workflow.state(), &WorkflowState::Committed);
        assert_eq!(workflow.selection().len(), 2);
        assert_eq!(workflow.commit(), None);
    }

    #[test]
    fn test_commit_only_while_browsing() {
        let mut workflow = SelectionWorkflow::new();

        assert_eq!(workflow.commit(), None);
        assert_eq!(workflow.state(), &WorkflowState::Loading);
    }

    #[test]
    fn test_commit_discards_pending_response() {
        let mut workflow = browsing();
        let request = workflow.change_page(page(2)).unwrap();

        assert_eq!(workflow.commit(), Some(vec![]));
        assert!(!workflow.resolve(&request, Ok(second_page())));
        assert_eq!(workflow.catalog().page, Page::FIRST);
    }

    #[test]
    fn test_cancel() {
        let mut workflow = browsing();
        workflow.toggle(&SQUAT);
        workflow.set_name("Squ");
        let request = workflow.change_page(page(2)).unwrap();

        workflow.cancel();

        assert_eq!(workflow.state(), &WorkflowState::Cancelled);
        assert!(workflow.selection().is_empty());
        assert!(workflow.filter().is_empty());
        assert!(!workflow.is_fetching());

        assert!(!workflow.resolve(&request, Ok(second_page())));
        assert_eq!(workflow.catalog().page, Page::FIRST);
        assert_eq!(workflow.commit(), None);
        assert_eq!(workflow.change_page(page(3)), None);
    }

    #[test]
    fn test_cancel_while_loading() {
        let mut workflow = SelectionWorkflow::new();
        let request = workflow.start().unwrap();

        workflow.cancel();

        assert!(!workflow.resolve(&request, Ok(initial_catalog())));
        assert_eq!(workflow.state(), &WorkflowState::Cancelled);
    }
}
