/// MCP server for the course recommender.
///
/// Every tool forwards to the session loop, which owns the catalog and the selection:
/// - `catalog_status`, `list_subcategories`, `get_course`: catalog lookups
/// - `set_subcategory`, `set_query`, `add_skill`, `remove_skill`, `clear_skills`,
///   `get_selection`: selection state
/// - `available_skills`, `recommend`: derived views of the current selection
/// - `reload_catalog`: re-read the course data source
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use course_engine::mcp_api::{
    AvailableSkillsResponse, CatalogStatusResponse, CourseDetailResponse, GetCourseParams,
    RecommendParams, RecommendationResponse, ReloadCatalogResponse, SelectionResponse,
    SetQueryParams, SetSubcategoryParams, SkillParams, SubcategoryListResponse,
};

use crate::config::MAX_RECOMMENDATIONS;
use crate::session_loop::{Command, SessionHandle};

#[derive(Clone)]
pub struct CourseRecommenderServer {
    session: SessionHandle,
    default_limit: usize,
    tool_router: ToolRouter<CourseRecommenderServer>,
}

impl CourseRecommenderServer {
    pub fn new(session: SessionHandle, default_limit: usize) -> Self {
        Self {
            session,
            default_limit,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl CourseRecommenderServer {
    #[tool(description = "Report whether the course catalog loaded, with course, skill and subcategory counts and the number of rows dropped as invalid.")]
    async fn catalog_status(&self) -> Result<Json<CatalogStatusResponse>, String> {
        let status = self
            .session
            .request(Command::Status)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(status))
    }

    #[tool(description = "List the subcategories skills can be filtered by. The first entry is always 'All'.")]
    async fn list_subcategories(&self) -> Result<Json<SubcategoryListResponse>, String> {
        let list = self
            .session
            .request(Command::ListSubcategories)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(list))
    }

    #[tool(description = "Restrict available_skills to one subcategory, or pass 'All' to lift the restriction.")]
    async fn set_subcategory(
        &self,
        Parameters(params): Parameters<SetSubcategoryParams>,
    ) -> Result<Json<SelectionResponse>, String> {
        let subcategory = require_non_blank(params.subcategory, "subcategory")?;
        let selection = self
            .session
            .request(|reply| Command::SetSubcategory(subcategory, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "Set the skill search text. available_skills keeps skills containing it, ignoring case. An empty query shows every skill.")]
    async fn set_query(
        &self,
        Parameters(params): Parameters<SetQueryParams>,
    ) -> Result<Json<SelectionResponse>, String> {
        let selection = self
            .session
            .request(|reply| Command::SetQuery(params.query, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "Add a skill to the selection. Adding an already selected skill changes nothing.")]
    async fn add_skill(
        &self,
        Parameters(params): Parameters<SkillParams>,
    ) -> Result<Json<SelectionResponse>, String> {
        let skill = params.skill.trim().to_string();
        if skill.is_empty() {
            return Err("skill must not be empty".to_string());
        }
        let selection = self
            .session
            .request(|reply| Command::AddSkill(skill, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "Remove a skill from the selection. Removing a skill that is not selected changes nothing.")]
    async fn remove_skill(
        &self,
        Parameters(params): Parameters<SkillParams>,
    ) -> Result<Json<SelectionResponse>, String> {
        let skill = params.skill.trim().to_string();
        let selection = self
            .session
            .request(|reply| Command::RemoveSkill(skill, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "Remove every skill from the selection.")]
    async fn clear_skills(&self) -> Result<Json<SelectionResponse>, String> {
        let selection = self
            .session
            .request(Command::ClearSkills)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "Show the current subcategory, search query and selected skills.")]
    async fn get_selection(&self) -> Result<Json<SelectionResponse>, String> {
        let selection = self
            .session
            .request(Command::GetSelection)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(selection))
    }

    #[tool(description = "List the skills that can be selected under the current subcategory and search query, in ascending order.")]
    async fn available_skills(&self) -> Result<Json<AvailableSkillsResponse>, String> {
        let skills = self
            .session
            .request(Command::AvailableSkills)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(skills))
    }

    #[tool(description = "Recommend courses for the selected skills, best match first. Each result lists matched skills, bonus skills and rating. Returns nothing while no skill is selected.")]
    async fn recommend(
        &self,
        Parameters(params): Parameters<RecommendParams>,
    ) -> Result<Json<RecommendationResponse>, String> {
        let limit = params
            .limit
            .map_or(self.default_limit, |n| n as usize)
            .clamp(1, MAX_RECOMMENDATIONS);
        let ranked = self
            .session
            .request(|reply| Command::Recommend(limit, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(ranked))
    }

    #[tool(description = "Get every detail of one course (description, difficulty, duration, enrollment, URL, full skill list) by the key returned in recommendations.")]
    async fn get_course(
        &self,
        Parameters(params): Parameters<GetCourseParams>,
    ) -> Result<Json<CourseDetailResponse>, String> {
        let key = require_non_blank(params.key, "key")?;
        let course = self
            .session
            .request(|reply| Command::GetCourse(key, reply))
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(course))
    }

    #[tool(description = "Re-read the course data source and rebuild the catalog. The selection is kept. On failure the current catalog stays in place.")]
    async fn reload_catalog(&self) -> Result<Json<ReloadCatalogResponse>, String> {
        info!("reload_catalog tool invoked");
        let reloaded = self
            .session
            .request(Command::Reload)
            .await
            .map_err(|e| format!("reload failed: {e}"))?;
        Ok(Json(reloaded))
    }
}

/// Reject blank input but pass the value through untouched: catalog keys and
/// subcategory names are matched exactly, surrounding whitespace included.
fn require_non_blank(value: String, field: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(value)
}

#[tool_handler]
impl ServerHandler for CourseRecommenderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "course-recommender".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Course recommender MCP server. Browse skills with list_subcategories, \
                 set_subcategory, set_query and available_skills; build a selection with \
                 add_skill/remove_skill; then call recommend for courses ranked by how much \
                 of the selection they cover (ties broken by rating). Use get_course for \
                 the full details of a recommended course."
                    .to_string(),
            ),
        }
    }
}
