//! Account route handlers.
//!
//! These routes require authentication. The profile is created on first use;
//! every address mutation rewrites the whole list (last write wins).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use filament_shop_core::{Address, AddressBook, AddressId, NewAddress, UserProfile};

use crate::db::{RepositoryError, ShopStore};
use crate::error::{AppError, Result};
use crate::middleware::{Identity, RequireAuth};
use crate::state::AppState;

/// Load the caller's profile, creating it on first sign-in.
///
/// The role always reflects the caller's current group claims.
///
/// # Errors
///
/// Returns `RepositoryError` if the store fails.
pub async fn sync_profile(
    store: &dyn ShopStore,
    identity: &Identity,
) -> std::result::Result<UserProfile, RepositoryError> {
    let mut profile = match store.find_profile_by_email(&identity.email).await? {
        Some(profile) => profile,
        None => {
            let name = identity
                .name
                .clone()
                .unwrap_or_else(|| UserProfile::default_name(&identity.email));
            match store
                .create_profile(&name, &identity.email, identity.role)
                .await
            {
                Ok(profile) => {
                    tracing::info!(profile_id = %profile.id, "created profile");
                    profile
                }
                // Another request created it first
                Err(RepositoryError::Conflict(_)) => store
                    .find_profile_by_email(&identity.email)
                    .await?
                    .ok_or(RepositoryError::NotFound)?,
                Err(e) => return Err(e),
            }
        }
    };
    profile.role = identity.role;
    Ok(profile)
}

/// Show the caller's profile.
#[instrument(skip_all, fields(email = %identity.email))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<UserProfile>> {
    Ok(Json(sync_profile(state.store().as_ref(), &identity).await?))
}

/// Add an address. The first address becomes the default.
#[instrument(skip_all, fields(email = %identity.email))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Json(address): Json<NewAddress>,
) -> Result<(StatusCode, Json<AddressBook>)> {
    let book = update_addresses(&state, &identity, |book| {
        book.add(address);
        true
    })
    .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace an address.
#[instrument(skip_all, fields(email = %identity.email, address_id = %id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<String>,
    Json(mut address): Json<Address>,
) -> Result<Json<AddressBook>> {
    address.id = AddressId::new(id);
    let book = update_addresses(&state, &identity, |book| book.edit(address)).await?;
    Ok(Json(book))
}

/// Make an address the default.
#[instrument(skip_all, fields(email = %identity.email, address_id = %id))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<AddressBook>> {
    let id = AddressId::new(id);
    let book = update_addresses(&state, &identity, |book| book.set_default(&id)).await?;
    Ok(Json(book))
}

/// Delete an address.
#[instrument(skip_all, fields(email = %identity.email, address_id = %id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<AddressBook>> {
    let id = AddressId::new(id);
    let book = update_addresses(&state, &identity, |book| book.delete(&id)).await?;
    Ok(Json(book))
}

/// Apply `change` to the caller's address book and persist it.
///
/// `change` returns `false` when the target address does not exist.
async fn update_addresses(
    state: &AppState,
    identity: &Identity,
    change: impl FnOnce(&mut AddressBook) -> bool + Send,
) -> Result<AddressBook> {
    let store = state.store().as_ref();
    let mut profile = sync_profile(store, identity).await?;

    if !change(&mut profile.addresses) {
        return Err(AppError::NotFound("address".to_string()));
    }

    store
        .save_addresses(&profile.id, &profile.addresses)
        .await?;
    Ok(profile.addresses)
}
