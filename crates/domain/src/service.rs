use log::{debug, error};

use crate::{CatalogRepository, Exercise, FetchError, MuscleGroup, Page};

#[allow(async_fn_in_trait)]
pub trait CatalogService {
    async fn get_muscle_groups(&self) -> Result<Vec<MuscleGroup>, FetchError>;
    async fn get_exercises(&self, page: Page) -> Result<Vec<Exercise>, FetchError>;
}

pub struct Service<R> {
    repository: R,
}

impl<R: CatalogRepository> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: expr) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                crate::ReadError::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result.map_err(FetchError::from)
    }};
}

impl<R: CatalogRepository> CatalogService for Service<R> {
    async fn get_muscle_groups(&self) -> Result<Vec<MuscleGroup>, FetchError> {
        log_on_error!(
            self.repository.read_muscle_groups(),
            "get",
            "muscle groups"
        )
    }

    async fn get_exercises(&self, page: Page) -> Result<Vec<Exercise>, FetchError> {
        log_on_error!(
            self.repository.read_exercises(page),
            "get",
            format!("exercises of page {page}")
        )
    }
}
