use serde::Deserialize;
use uuid::Uuid;

use tenderhub_auth::{NewOrganization, NewUser, Organization, OrganizationType, Responsibility, User};
use tenderhub_bids::{AuthorType, Bid, BidAuthor, BidPatch, NewBid};
use tenderhub_core::{LifecycleStatus, OrganizationId, Page, TenderId, UserId};
use tenderhub_tenders::{NewTender, ServiceType, Tender, TenderPatch};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(body: CreateUserRequest) -> Self {
        NewUser {
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub organization_type: OrganizationType,
}

impl From<CreateOrganizationRequest> for NewOrganization {
    fn from(body: CreateOrganizationRequest) -> Self {
        NewOrganization {
            name: body.name,
            description: body.description,
            organization_type: body.organization_type,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateResponsibilityRequest {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub organization_id: OrganizationId,
    pub creator_username: String,
}

impl From<CreateTenderRequest> for NewTender {
    fn from(body: CreateTenderRequest) -> Self {
        NewTender {
            name: body.name,
            description: body.description,
            service_type: body.service_type,
            organization_id: body.organization_id,
            creator_username: body.creator_username,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTenderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
}

impl From<EditTenderRequest> for TenderPatch {
    fn from(body: EditTenderRequest) -> Self {
        TenderPatch {
            name: body.name,
            description: body.description,
            service_type: body.service_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidRequest {
    pub name: String,
    pub description: String,
    pub tender_id: TenderId,
    pub author_type: AuthorType,
    pub author_id: Uuid,
}

impl From<CreateBidRequest> for NewBid {
    fn from(body: CreateBidRequest) -> Self {
        NewBid {
            name: body.name,
            description: body.description,
            tender_id: body.tender_id,
            author: BidAuthor::from_parts(body.author_type, body.author_id),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditBidRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<EditBidRequest> for BidPatch {
    fn from(body: EditBidRequest) -> Self {
        BidPatch {
            name: body.name,
            description: body.description,
        }
    }
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RequesterQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct RequesterPageQuery {
    pub username: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RequesterPageQuery {
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusQuery {
    pub status: LifecycleStatus,
    pub username: String,
}

/// `GET /tenders` accepts `service_type` more than once, which the plain
/// struct form of `Query` cannot express.
#[derive(Debug, Default, PartialEq)]
pub struct ListTendersQuery {
    pub service_types: Vec<ServiceType>,
    pub page: Page,
}

impl ListTendersQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, axum::response::Response> {
        let mut service_types = Vec::new();
        let mut limit = None;
        let mut offset = None;

        for (key, value) in pairs {
            match key.as_str() {
                "service_type" => {
                    service_types.push(value.parse::<ServiceType>().map_err(errors::invalid_request)?)
                }
                "limit" => limit = Some(value.parse::<i64>().map_err(errors::invalid_request)?),
                "offset" => offset = Some(value.parse::<i64>().map_err(errors::invalid_request)?),
                _ => {}
            }
        }

        Ok(Self {
            service_types,
            page: Page::new(limit, offset),
        })
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "username": user.username,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "created_at": user.created_at.to_rfc3339(),
        "updated_at": user.updated_at.to_rfc3339(),
    })
}

pub fn organization_to_json(org: &Organization) -> serde_json::Value {
    serde_json::json!({
        "id": org.id.to_string(),
        "name": org.name,
        "description": org.description,
        "type": org.organization_type.code(),
        "created_at": org.created_at.to_rfc3339(),
        "updated_at": org.updated_at.to_rfc3339(),
    })
}

pub fn responsibility_to_json(r: &Responsibility) -> serde_json::Value {
    serde_json::json!({
        "id": r.id.to_string(),
        "organization_id": r.organization_id.to_string(),
        "user_id": r.user_id.to_string(),
    })
}

pub fn tender_to_json(t: &Tender) -> serde_json::Value {
    serde_json::json!({
        "id": t.id.to_string(),
        "name": t.name,
        "description": t.description,
        "status": t.status.as_str(),
        "serviceType": t.service_type.as_str(),
        "organizationId": t.organization_id.to_string(),
        "version": t.version,
        "createdAt": t.created_at.to_rfc3339(),
    })
}

pub fn bid_to_json(b: &Bid) -> serde_json::Value {
    serde_json::json!({
        "id": b.id.to_string(),
        "name": b.name,
        "description": b.description,
        "status": b.status.as_str(),
        "tenderId": b.tender_id.to_string(),
        "authorType": b.author.kind().as_str(),
        "authorId": b.author.uuid().to_string(),
        "version": b.version,
        "createdAt": b.created_at.to_rfc3339(),
    })
}
