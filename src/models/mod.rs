mod client;
mod payloads;
mod responses;
mod service;
mod service_request;

pub use client::{Client, ClientSummary, NewClient};
pub use payloads::{
    ChangePasswordPayload, LoginPayload, RegisterClientPayload, ReplaceRequestsPayload,
    RequestItemPayload, ServicePayload,
};
pub use responses::{LoginData, NoData, RequestList, ServiceCreated, ServiceList};
pub use service::{NewService, Service};
pub use service_request::{DEFAULT_STATUS, NewServiceRequest, ServiceRequestView};
