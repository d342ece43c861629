//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AdminLoginRequest, AuditLogQuery, CleanupRequest, ClientContext, RefreshTokenRequest,
    StatsQuery,
};
pub use responses::{
    AdminLoginResponse, AdminUserResponse, AuditLogListResponse, AuthStatusResponse,
    BotAccessResponse, BotEligibility, HealthChecks, HealthResponse, LoginStatsResponse,
    MaintenanceResponse, MessageResponse, MyBotsResponse, ReadinessResponse, RevokedResponse,
    SecurityReportResponse, SessionListResponse, SessionResponse, SessionStatsResponse,
    TokenRefreshResponse,
};
