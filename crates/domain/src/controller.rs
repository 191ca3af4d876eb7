use std::cell::{Ref, RefCell};

use futures_util::future::{AbortHandle, abortable};
use log::debug;

use crate::{
    CatalogService, Exercise, ExerciseFilter, FetchError, FetchRequest, FetchedCatalog,
    MuscleGroupID, Page, SelectionWorkflow, Ticket, WorkflowState,
};

/// Drives a [`SelectionWorkflow`] by running its catalog fetches.
///
/// All methods take `&self`, so user input can be handled while a fetch is awaited. The workflow
/// is never borrowed across an await point.
pub struct WorkflowController<S> {
    service: S,
    workflow: RefCell<SelectionWorkflow>,
    in_flight: RefCell<Vec<(Ticket, AbortHandle)>>,
}

impl<S: CatalogService> WorkflowController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            workflow: RefCell::new(SelectionWorkflow::new()),
            in_flight: RefCell::new(vec![]),
        }
    }

    pub async fn start(&self) {
        let request = self.workflow.borrow_mut().start();
        self.run(request).await;
    }

    pub async fn retry(&self) {
        let request = self.workflow.borrow_mut().retry();
        self.run(request).await;
    }

    pub async fn change_page(&self, page: Page) {
        let request = self.workflow.borrow_mut().change_page(page);
        self.run(request).await;
    }

    pub fn set_filter(&self, filter: ExerciseFilter) {
        self.workflow.borrow_mut().set_filter(filter);
    }

    pub fn set_name(&self, name: &str) {
        self.workflow.borrow_mut().set_name(name);
    }

    pub fn toggle_muscle_group(&self, muscle_group: &MuscleGroupID) {
        self.workflow.borrow_mut().toggle_muscle_group(muscle_group);
    }

    pub fn toggle(&self, exercise: &Exercise) {
        self.workflow.borrow_mut().toggle(exercise);
    }

    pub fn commit(&self) -> Option<Vec<Exercise>> {
        let selection = self.workflow.borrow_mut().commit();
        if selection.is_some() {
            self.abort_fetches();
        }
        selection
    }

    pub fn cancel(&self) {
        self.abort_fetches();
        self.workflow.borrow_mut().cancel();
    }

    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.workflow.borrow().state().clone()
    }

    #[must_use]
    pub fn visible_exercises(&self) -> Vec<Exercise> {
        self.workflow
            .borrow()
            .visible_exercises()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Visible exercises with their selection badge, detached from the workflow.
    #[must_use]
    pub fn entries(&self) -> Vec<(Exercise, Option<usize>)> {
        self.workflow
            .borrow()
            .entries()
            .into_iter()
            .map(|(exercise, position)| (exercise.clone(), position))
            .collect()
    }

    /// Read access to the workflow. The guard must be dropped before the next await.
    #[must_use]
    pub fn workflow(&self) -> Ref<'_, SelectionWorkflow> {
        self.workflow.borrow()
    }

    async fn run(&self, request: Option<FetchRequest>) {
        let Some(request) = request else {
            return;
        };

        let (fetch, handle) = abortable(self.fetch(&request));
        self.in_flight.borrow_mut().push((request.ticket, handle));
        let _in_flight = InFlight {
            workflow: &self.workflow,
            in_flight: &self.in_flight,
            request: request.clone(),
        };

        match fetch.await {
            Ok(result) => {
                self.workflow.borrow_mut().resolve(&request, result);
            }
            Err(_) => {
                debug!("aborted fetch of page {}", request.page);
            }
        }
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedCatalog, FetchError> {
        let muscle_groups = if request.with_muscle_groups {
            Some(self.service.get_muscle_groups().await?)
        } else {
            None
        };
        let exercises = self.service.get_exercises(request.page).await?;
        Ok(FetchedCatalog {
            muscle_groups,
            exercises,
        })
    }

    fn abort_fetches(&self) {
        for (_, handle) in self.in_flight.borrow_mut().drain(..) {
            handle.abort();
        }
    }
}

/// Unregisters a fetch when it completes or when its future is dropped.
struct InFlight<'a> {
    workflow: &'a RefCell<SelectionWorkflow>,
    in_flight: &'a RefCell<Vec<(Ticket, AbortHandle)>>,
    request: FetchRequest,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.try_borrow_mut() {
            in_flight.retain(|(ticket, _)| *ticket != self.request.ticket);
        }
        if let Ok(mut workflow) = self.workflow.try_borrow_mut() {
            workflow.abandon(&self.request);
        }
    }
}
