//! JSON REST handlers for places.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer, Serialize};

use placehub_app::ports::PlaceRepository;
use placehub_domain::error::ValidationError;
use placehub_domain::id::PlaceId;
use placehub_domain::page::Page;
use placehub_domain::place::{NewPlace, Place, PlaceChanges};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string accepted by the list endpoint.
///
/// Numbers are kept as text so that junk like `?page=abc` falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListQuery {
    fn page(&self) -> Option<i64> {
        parse_number(self.page.as_deref())
    }

    fn per_page(&self) -> Option<i64> {
        parse_number(self.per_page.as_deref())
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Request body for creating a place.
///
/// Every field is optional here so that a missing field is reported as a
/// validation error rather than a decoding error.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlaceRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl CreatePlaceRequest {
    fn into_new_place(self) -> Result<NewPlace, ValidationError> {
        let mut builder = NewPlace::builder();
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(slug) = self.slug {
            builder = builder.slug(slug);
        }
        if let Some(city) = self.city {
            builder = builder.city(city);
        }
        if let Some(state) = self.state {
            builder = builder.state(state);
        }
        builder.build()
    }
}

/// Request body for updating a place.
///
/// For `name`, `city` and `state` the outer `Option` records whether the key
/// was sent at all; an explicit `null` is a blank value and fails validation.
/// A `null` slug is the same as leaving it out.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlaceRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub state: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdatePlaceRequest {
    fn into_changes(self) -> Result<PlaceChanges, ValidationError> {
        let mut builder = PlaceChanges::builder();
        if let Some(name) = self.name {
            builder = builder.name(name.unwrap_or_default());
        }
        if let Some(slug) = self.slug {
            builder = builder.slug(slug);
        }
        if let Some(city) = self.city {
            builder = builder.city(city.unwrap_or_default());
        }
        if let Some(state) = self.state {
            builder = builder.state(state.unwrap_or_default());
        }
        builder.build()
    }
}

/// Single-record envelope.
#[derive(Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// Paginated list envelope.
#[derive(Serialize)]
pub struct ListBody {
    pub data: Vec<Place>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl From<Page<Place>> for ListBody {
    fn from(page: Page<Place>) -> Self {
        let last_page = page.last_page();
        let from = page.from();
        let to = page.to();
        Self {
            data: page.items,
            current_page: page.current_page,
            per_page: page.per_page,
            total: page.total,
            last_page,
            from,
            to,
        }
    }
}

/// Confirmation body returned after a delete.
#[derive(Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<ListBody>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<DataBody<Place>>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<DataBody<Place>>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    Ok(Json<DataBody<Place>>),
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    Deleted,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Deleted => Json(MessageBody {
                message: "Place deleted successfully",
            })
            .into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<PlaceId, ApiError> {
    PlaceId::from_str(id).map_err(|_| ApiError::place_not_found(id))
}

/// `GET /api/places`
pub async fn list<PR>(
    State(state): State<AppState<PR>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    PR: PlaceRepository + Send + Sync + 'static,
{
    let page = state
        .place_service
        .list_places(query.name.as_deref(), query.page(), query.per_page())
        .await?;
    Ok(ListResponse::Ok(Json(page.into())))
}

/// `GET /api/places/{id}`
pub async fn get<PR>(
    State(state): State<AppState<PR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    PR: PlaceRepository + Send + Sync + 'static,
{
    let place_id = parse_id(&id)?;
    let place = state.place_service.get_place(place_id).await?;
    Ok(GetResponse::Ok(Json(DataBody { data: place })))
}

/// `POST /api/places`
pub async fn create<PR>(
    State(state): State<AppState<PR>>,
    body: Result<Json<CreatePlaceRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    PR: PlaceRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let new_place = req.into_new_place()?;
    let created = state.place_service.create_place(new_place).await?;
    Ok(CreateResponse::Created(Json(DataBody { data: created })))
}

/// `PUT|PATCH /api/places/{id}`
pub async fn update<PR>(
    State(state): State<AppState<PR>>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePlaceRequest>, JsonRejection>,
) -> Result<UpdateResponse, ApiError>
where
    PR: PlaceRepository + Send + Sync + 'static,
{
    let place_id = parse_id(&id)?;
    let Json(req) = body?;
    let changes = req.into_changes()?;
    let updated = state.place_service.update_place(place_id, changes).await?;
    Ok(UpdateResponse::Ok(Json(DataBody { data: updated })))
}

/// `DELETE /api/places/{id}`
pub async fn delete<PR>(
    State(state): State<AppState<PR>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    PR: PlaceRepository + Send + Sync + 'static,
{
    let place_id = parse_id(&id)?;
    if state.place_service.delete_place(place_id).await? {
        Ok(DeleteResponse::Deleted)
    } else {
        Err(ApiError::place_not_found(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_ignore_unparseable_page_numbers() {
        let query = ListQuery {
            name: None,
            page: Some("abc".to_string()),
            per_page: Some(" 5 ".to_string()),
        };

        assert_eq!(query.page(), None);
        assert_eq!(query.per_page(), Some(5));
    }

    #[test]
    fn should_report_missing_create_fields_as_validation_errors() {
        let req: CreatePlaceRequest = serde_json::from_str(r#"{"name":"Central Park"}"#).unwrap();

        let err = req.into_new_place().unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field().as_str()).collect();
        assert_eq!(fields, vec!["city", "state"]);
    }

    #[test]
    fn should_distinguish_absent_from_null_on_update() {
        let req: UpdatePlaceRequest =
            serde_json::from_str(r#"{"city":null,"slug":null}"#).unwrap();

        assert!(req.name.is_none());
        assert_eq!(req.city, Some(None));
        assert!(req.slug.is_none());
    }

    #[test]
    fn should_reject_null_name_on_update() {
        let req: UpdatePlaceRequest = serde_json::from_str(r#"{"name":null}"#).unwrap();

        let err = req.into_changes().unwrap_err();

        assert_eq!(err.to_string(), "The name field is required.");
    }

    #[test]
    fn should_treat_empty_update_body_as_no_changes() {
        let req: UpdatePlaceRequest = serde_json::from_str("{}").unwrap();

        let changes = req.into_changes().unwrap();

        assert!(changes.is_empty());
    }
}
