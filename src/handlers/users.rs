//! User profile HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    ChangePasswordRequest, CreatePayoutAccountRequest, PageQuery, Paginated, PayoutAccount,
    PurchaseSummary, SendCodeResponse, SendEmailChangeCodeRequest, TransactionResponse,
    UpdateProfileRequest, UserResponse, VerifyEmailChangeRequest, WalletResponse,
};
use crate::state::AppState;

/// GET /api/user/profile - Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let profile = state.user_service.get_profile(user.user_id).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/user/profile - Update username/avatar
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let profile = state.user_service.update_profile(user.user_id, req).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/user/password - Change password
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    state
        .user_service
        .change_password(user.user_id, &req.current_password, &req.new_password)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Password change invalidates every other session
    state.auth_service.revoke_all_sessions(user.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/user/email/send-code - Email a code to the new address
pub async fn send_email_change_code(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<SendEmailChangeCodeRequest>,
) -> Result<Json<SendCodeResponse>, ApiError> {
    req.validate()?;

    let expires_in = state
        .user_service
        .send_email_change_code(user.user_id, &req.new_email)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(SendCodeResponse { expires_in }))
}

/// POST /api/user/email/verify - Apply the email change
pub async fn verify_email_change(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<VerifyEmailChangeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    req.validate()?;

    let profile = state
        .user_service
        .verify_email_change(user.user_id, &req.new_email, &req.code)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(profile.into()))
}

/// GET /api/user/wallet - Balance summary
pub async fn get_wallet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.user_service.get_wallet(user.user_id).await?;
    Ok(Json(wallet))
}

/// GET /api/user/purchases - Resources the user has bought
pub async fn get_purchases(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PurchaseSummary>>, ApiError> {
    let purchases = state.resource_service.list_purchases(user.user_id).await?;
    Ok(Json(purchases))
}

/// GET /api/user/transactions - Payment history
pub async fn get_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<TransactionResponse>>, ApiError> {
    let transactions = state
        .payment_service
        .transactions_for_user(user.user_id, page.page(), page.page_size())
        .await?;
    Ok(Json(transactions))
}

/// GET /api/user/payout-accounts - List payout accounts
pub async fn list_payout_accounts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<PayoutAccount>>, ApiError> {
    let accounts = state.payment_service.payout_accounts(user.user_id).await?;
    Ok(Json(accounts))
}

/// POST /api/user/payout-accounts - Register a payout account
pub async fn create_payout_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CreatePayoutAccountRequest>,
) -> Result<(StatusCode, Json<PayoutAccount>), ApiError> {
    req.validate()?;

    let account = state
        .payment_service
        .create_payout_account(user.user_id, req)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// PUT /api/user/payout-accounts/:id/default - Set the default account
pub async fn set_default_payout_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PayoutAccount>, ApiError> {
    let account = state
        .payment_service
        .set_default_payout_account(user.user_id, id)
        .await?;
    Ok(Json(account))
}

/// DELETE /api/user/payout-accounts/:id - Deactivate a payout account
pub async fn delete_payout_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .payment_service
        .delete_payout_account(user.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
