/// The single actor that owns the catalog and the learner's selection.
///
/// Tool handlers never touch engine state directly. They send a [`Command`] through a
/// [`SessionHandle`] and await the reply; the loop applies commands one at a time, in
/// arrival order. The loop starts by loading the catalog; commands sent meanwhile wait
/// in the queue. A failed initial load is terminal and every later command is answered
/// with that failure.
use course_engine::catalog::CatalogIndex;
use course_engine::error::LoadError;
use course_engine::filter::{SubcategoryFilter, ALL_SUBCATEGORIES};
use course_engine::mcp_api::{
    AvailableSkillsResponse, CatalogStatusResponse, CourseDetailResponse, CourseRecommendation,
    RecommendationResponse, ReloadCatalogResponse, SelectionResponse, SubcategoryListResponse,
};
use course_engine::ranking::RatingOrder;
use course_engine::session::SelectionSession;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::cache::RecommendationCache;
use crate::error::AppError;
use crate::source::SourceLoader;

const QUEUE_DEPTH: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, AppError>>;

pub enum Command {
    Status(Reply<CatalogStatusResponse>),
    ListSubcategories(Reply<SubcategoryListResponse>),
    SetSubcategory(String, Reply<SelectionResponse>),
    SetQuery(String, Reply<SelectionResponse>),
    AddSkill(String, Reply<SelectionResponse>),
    RemoveSkill(String, Reply<SelectionResponse>),
    ClearSkills(Reply<SelectionResponse>),
    GetSelection(Reply<SelectionResponse>),
    AvailableSkills(Reply<AvailableSkillsResponse>),
    Recommend(usize, Reply<RecommendationResponse>),
    GetCourse(String, Reply<CourseDetailResponse>),
    Reload(Reply<ReloadCatalogResponse>),
}

enum CatalogState {
    Ready(CatalogIndex),
    Failed(LoadError),
}

/// Cloneable sender side of the session loop.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Send a command and wait for the loop's answer.
    pub async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| AppError::Unavailable("session loop stopped".to_string()))?;
        rx.await
            .map_err(|_| AppError::Unavailable("session loop dropped the request".to_string()))?
    }
}

pub struct SessionLoop {
    state: CatalogState,
    session: SelectionSession,
    cache: RecommendationCache,
    loader: SourceLoader,
    rating_order: RatingOrder,
}

impl SessionLoop {
    /// Start the loop on the runtime and return its handle.
    pub fn spawn(loader: SourceLoader, rating_order: RatingOrder) -> SessionHandle {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(async move {
            info!(source = %loader.source().describe(), "loading course data");
            let state = match loader.load().await {
                Ok(catalog) => CatalogState::Ready(catalog),
                Err(e) => {
                    error!(error = %e, "course data load failed");
                    CatalogState::Failed(e)
                }
            };
            let session_loop = SessionLoop {
                state,
                session: SelectionSession::new(),
                cache: RecommendationCache::default(),
                loader,
                rating_order,
            };
            session_loop.run(rx).await;
        });
        SessionHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }
        info!("session loop stopped");
    }

    async fn handle(&mut self, command: Command) {
        // A closed reply channel only means the caller went away.
        match command {
            Command::Status(reply) => {
                let _ = reply.send(Ok(self.status()));
            }
            Command::ListSubcategories(reply) => {
                let _ = reply.send(self.list_subcategories());
            }
            Command::SetSubcategory(value, reply) => {
                let _ = reply.send(self.set_subcategory(&value));
            }
            Command::SetQuery(query, reply) => {
                let _ = reply.send(self.mutate(|session| {
                    let changed = session.query() != query;
                    session.set_query(query);
                    changed
                }));
            }
            Command::AddSkill(skill, reply) => {
                let _ = reply.send(self.mutate(|session| session.add_skill(skill)));
            }
            Command::RemoveSkill(skill, reply) => {
                let _ = reply.send(self.mutate(|session| session.remove_skill(&skill)));
            }
            Command::ClearSkills(reply) => {
                let _ = reply.send(self.mutate(|session| {
                    let changed = !session.selected_skills().is_empty();
                    session.clear_skills();
                    changed
                }));
            }
            Command::GetSelection(reply) => {
                let _ = reply.send(self.mutate(|_| false));
            }
            Command::AvailableSkills(reply) => {
                let _ = reply.send(self.available_skills());
            }
            Command::Recommend(limit, reply) => {
                let _ = reply.send(self.recommend(limit));
            }
            Command::GetCourse(key, reply) => {
                let _ = reply.send(self.get_course(&key));
            }
            Command::Reload(reply) => {
                let _ = reply.send(self.reload().await);
            }
        }
    }

    fn status(&self) -> CatalogStatusResponse {
        match &self.state {
            CatalogState::Ready(catalog) => CatalogStatusResponse {
                state: "ready".to_string(),
                course_count: catalog.courses().len(),
                skill_count: catalog.vocabulary().len(),
                subcategory_count: catalog.subcategories().len(),
                row_count: catalog.row_count(),
                dropped_rows: catalog.dropped_rows(),
                duplicate_rows: catalog.duplicate_rows(),
                error: None,
            },
            CatalogState::Failed(e) => CatalogStatusResponse {
                state: "failed".to_string(),
                course_count: 0,
                skill_count: 0,
                subcategory_count: 0,
                row_count: 0,
                dropped_rows: 0,
                duplicate_rows: 0,
                error: Some(e.to_string()),
            },
        }
    }

    fn list_subcategories(&self) -> Result<SubcategoryListResponse, AppError> {
        let catalog = ready(&self.state)?;
        let subcategories = std::iter::once(ALL_SUBCATEGORIES.to_string())
            .chain(catalog.subcategories().iter().cloned())
            .collect();
        Ok(SubcategoryListResponse { subcategories })
    }

    fn set_subcategory(&mut self, value: &str) -> Result<SelectionResponse, AppError> {
        let catalog = ready(&self.state)?;
        let filter = SubcategoryFilter::parse(value);
        if let SubcategoryFilter::Named(name) = &filter {
            if !catalog.has_subcategory(name) {
                return Err(AppError::UnknownSubcategory(format!(
                    "'{name}'. Available subcategories: {ALL_SUBCATEGORIES}, {}",
                    catalog.subcategories().join(", ")
                )));
            }
        }
        let changed = self.session.subcategory() != &filter;
        self.session.set_subcategory(filter);
        Ok(self.selection(changed))
    }

    /// Apply a session mutation; `apply` reports whether anything changed.
    fn mutate<F>(&mut self, apply: F) -> Result<SelectionResponse, AppError>
    where
        F: FnOnce(&mut SelectionSession) -> bool,
    {
        ready(&self.state)?;
        let changed = apply(&mut self.session);
        if changed {
            debug!(
                subcategory = %self.session.subcategory(),
                query = self.session.query(),
                selected = self.session.selected_skills().len(),
                "selection changed"
            );
        }
        Ok(self.selection(changed))
    }

    fn selection(&self, changed: bool) -> SelectionResponse {
        SelectionResponse {
            subcategory: self.session.subcategory().to_string(),
            query: self.session.query().to_string(),
            selected_skills: self.session.selected_skills().to_vec(),
            changed,
        }
    }

    fn available_skills(&self) -> Result<AvailableSkillsResponse, AppError> {
        let catalog = ready(&self.state)?;
        let skills = self.session.available_skills(catalog);
        Ok(AvailableSkillsResponse {
            subcategory: self.session.subcategory().to_string(),
            query: self.session.query().to_string(),
            count: skills.len(),
            skills,
        })
    }

    fn recommend(&mut self, limit: usize) -> Result<RecommendationResponse, AppError> {
        let catalog = ready(&self.state)?;
        let session = &self.session;
        let order = self.rating_order;
        let ranked = self
            .cache
            .get_or_insert_with(&session.fingerprint(), || session.rank(catalog, order));
        debug!(
            selected = session.selected_skills().len(),
            matches = ranked.len(),
            cached = self.cache.len(),
            "recommendations ranked"
        );
        Ok(RecommendationResponse {
            selected_count: session.selected_skills().len(),
            total_matches: ranked.len(),
            recommendations: ranked
                .iter()
                .take(limit)
                .map(CourseRecommendation::from)
                .collect(),
        })
    }

    fn get_course(&self, key: &str) -> Result<CourseDetailResponse, AppError> {
        let catalog = ready(&self.state)?;
        catalog
            .course(key)
            .map(|course| CourseDetailResponse::from(course.as_ref()))
            .ok_or_else(|| AppError::CourseNotFound(key.to_string()))
    }

    async fn reload(&mut self) -> Result<ReloadCatalogResponse, AppError> {
        ready(&self.state)?;
        let catalog = self
            .loader
            .load()
            .await
            .inspect_err(|e| warn!(error = %e, "reload failed, keeping current catalog"))?;

        if let SubcategoryFilter::Named(name) = self.session.subcategory() {
            if !catalog.has_subcategory(name) {
                info!(subcategory = %name, "subcategory gone after reload, resetting to All");
                self.session.set_subcategory(SubcategoryFilter::All);
            }
        }
        self.cache.invalidate_all();

        let response = ReloadCatalogResponse {
            course_count: catalog.courses().len(),
            skill_count: catalog.vocabulary().len(),
            dropped_rows: catalog.dropped_rows(),
        };
        self.state = CatalogState::Ready(catalog);
        info!(courses = response.course_count, "catalog reloaded");
        Ok(response)
    }
}

fn ready(state: &CatalogState) -> Result<&CatalogIndex, AppError> {
    match state {
        CatalogState::Ready(catalog) => Ok(catalog),
        CatalogState::Failed(e) => Err(AppError::Unavailable(e.to_string())),
    }
}
