//! 가입/로그인 핸들러
//!
//! 가입과 로그인은 토큰을 발급하는 유일한 지점입니다.
//! 발급한 토큰은 계정 레코드에 기록되지만 이후 검증에는 사용되지 않습니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crm_core::id::IdGenerator;

use super::ensure_unique_email;

use crate::entities::{
    Customer, CustomerSignUp, CustomerView, SignIn, StaffSignUp, StaffUser, StaffUserView,
};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::Filter;

#[derive(Debug, Serialize)]
pub struct StaffAuthResponse {
    pub user: StaffUserView,
    pub token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CustomerSignUpResponse {
    pub customer_id: String,
    pub token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CustomerSignInResponse {
    pub customer: CustomerView,
    pub token: String,
    pub message: &'static str,
}

/// POST /user/signup
pub async fn staff_sign_up(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<StaffSignUp>,
) -> Result<(StatusCode, Json<StaffAuthResponse>)> {
    let request = request.validate()?;

    ensure_unique_email::<StaffUser>(&state.records, &request.email, None).await?;

    let password_hash = state.passwords.hash(&request.password).await?;
    let mut user = request.into_record(IdGenerator::generate(), password_hash);

    let token = state.tokens.issue(user.identity())?;
    user.token = Some(token.as_str().to_string());

    state.records.insert(&user).await?;
    tracing::info!(user_id = %user.user_id, role = %user.role, "staff user created");

    Ok((
        StatusCode::CREATED,
        Json(StaffAuthResponse {
            user: user.view(),
            token: token.into_string(),
            message: "User created successfully",
        }),
    ))
}

/// POST /user/signin
pub async fn staff_sign_in(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<SignIn>,
) -> Result<Json<StaffAuthResponse>> {
    let found = state
        .records
        .find_one::<StaffUser>(&Filter::new().eq("email", request.email.as_str()))
        .await?;

    let Some(mut user) = found else {
        state.passwords.verify_dummy(&request.password).await?;
        return Err(ApiError::InvalidCredentials);
    };

    if !state.passwords.verify(&request.password, &user.password).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.identity())?;
    state
        .records
        .persist_token::<StaffUser>(&user.user_id, &token)
        .await?;
    user.token = Some(token.as_str().to_string());

    tracing::debug!(user_id = %user.user_id, "staff user signed in");

    Ok(Json(StaffAuthResponse {
        user: user.view(),
        token: token.into_string(),
        message: "User logged in successfully",
    }))
}

/// POST /customer/signup
pub async fn customer_sign_up(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<CustomerSignUp>,
) -> Result<(StatusCode, Json<CustomerSignUpResponse>)> {
    let request = request.validate()?;

    ensure_unique_email::<Customer>(&state.records, &request.email, None).await?;

    let password_hash = match &request.password {
        Some(password) => Some(state.passwords.hash(password).await?),
        None => None,
    };
    let mut customer = request.into_record(IdGenerator::generate(), password_hash);

    let token = state.tokens.issue(customer.identity())?;
    customer.token = Some(token.as_str().to_string());

    state.records.insert(&customer).await?;
    tracing::info!(customer_id = %customer.customer_id, "customer created");

    Ok((
        StatusCode::CREATED,
        Json(CustomerSignUpResponse {
            customer_id: customer.customer_id,
            token: token.into_string(),
            message: "Customer created successfully",
        }),
    ))
}

/// POST /customer/signin
pub async fn customer_sign_in(
    State(state): State<Arc<AppState>>,
    Payload(request): Payload<SignIn>,
) -> Result<Json<CustomerSignInResponse>> {
    let found = state
        .records
        .find_one::<Customer>(&Filter::new().eq("email", request.email.as_str()))
        .await?;

    // 비밀번호 없는 고객(CSV 가져오기)도 없는 계정과 똑같이 처리
    let Some((mut customer, hash)) =
        found.and_then(|c| c.password.clone().map(|hash| (c, hash)))
    else {
        state.passwords.verify_dummy(&request.password).await?;
        return Err(ApiError::InvalidCredentials);
    };

    if !state.passwords.verify(&request.password, &hash).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(customer.identity())?;
    state
        .records
        .persist_token::<Customer>(&customer.customer_id, &token)
        .await?;
    customer.token = Some(token.as_str().to_string());

    tracing::debug!(customer_id = %customer.customer_id, "customer signed in");

    Ok(Json(CustomerSignInResponse {
        customer: customer.view(),
        token: token.into_string(),
        message: "Customer logged in successfully",
    }))
}
