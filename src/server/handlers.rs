use super::{error::AppError, views, SharedStore};
use crate::features::{
    parse_amount, today, Banker, BlockchainId, Profile, Store, Transaction, User,
};
use axum::extract::{Form, Path, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;

type HandlerResult<T> = Result<T, AppError>;

/// Runs a store mutation on the blocking pool, since every mutation rewrites a file.
/// The lock is held until the mutation and its writes finish.
async fn with_store<T, F>(store: SharedStore, mutation: F) -> HandlerResult<T>
where
    F: FnOnce(&mut Store) -> HandlerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let mut store = store.lock_owned().await;
    tokio::task::spawn_blocking(move || mutation(&mut *store)).await?
}

#[derive(Deserialize, Debug)]
pub struct UserLogin {
    #[serde(flatten)]
    profile: Profile,

    /// `yes` means `blockchain_id` holds an id the user already has
    blockchain_option: Option<String>,

    blockchain_id: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BankerLogin {
    #[serde(flatten)]
    profile: Profile,

    resignation: String,
}

#[derive(Deserialize, Debug)]
pub struct TransferRequest {
    receiver_id: String,
    amount: String,
}

pub async fn home() -> Html<String> {
    Html(views::home())
}

pub async fn user_login_form() -> Html<String> {
    Html(views::user_login())
}

pub async fn banker_login_form() -> Html<String> {
    Html(views::banker_login())
}

pub async fn user_login(
    State(store): State<SharedStore>,
    Form(form): Form<UserLogin>,
) -> HandlerResult<Redirect> {
    let blockchain_id = User::resolve_id(
        &form.profile,
        form.blockchain_option.as_deref(),
        form.blockchain_id.as_deref(),
    )?;

    let profile = form.profile;
    let registration = with_store(store, move |store| {
        Ok(User::register(profile, blockchain_id, store)?)
    })
    .await?;
    Ok(Redirect::to(&views::user_page_path(registration.id())))
}

pub async fn banker_login(
    State(store): State<SharedStore>,
    Form(form): Form<BankerLogin>,
) -> HandlerResult<Redirect> {
    let registration = with_store(store, move |store| {
        Ok(Banker::register(form.profile, form.resignation, store)?)
    })
    .await?;
    Ok(Redirect::to(&views::banker_page_path(registration.id())))
}

pub async fn user_page(
    State(store): State<SharedStore>,
    Path(blockchain_id): Path<String>,
) -> HandlerResult<Html<String>> {
    let blockchain_id = BlockchainId::from(blockchain_id);
    let store = store.lock().await;
    let user =
        User::find_by_id(&blockchain_id, &store).ok_or(AppError::UserNotFound(blockchain_id))?;
    Ok(Html(views::user_page(user)))
}

pub async fn transfer(
    State(store): State<SharedStore>,
    Path(blockchain_id): Path<String>,
    Form(form): Form<TransferRequest>,
) -> HandlerResult<Redirect> {
    let sender_id = BlockchainId::from(blockchain_id);
    let location = views::user_page_path(&sender_id);
    with_store(store, move |store| {
        if User::find_by_id(&sender_id, store).is_none() {
            return Err(AppError::UserNotFound(sender_id));
        }

        let amount = parse_amount(&form.amount)?;
        Transaction::transfer(sender_id, form.receiver_id.into(), amount, store)?;
        Ok(())
    })
    .await?;
    Ok(Redirect::to(&location))
}

/// Every user is listed, not only the ones this banker was notified about.
pub async fn banker_page(
    State(store): State<SharedStore>,
    Path(blockchain_id): Path<String>,
) -> HandlerResult<Html<String>> {
    let blockchain_id = BlockchainId::from(blockchain_id);
    let mut store = store.lock().await;
    let banker = Banker::find_by_id(&blockchain_id, &store)
        .cloned()
        .ok_or(AppError::BankerNotFound(blockchain_id))?;

    User::annotate_transaction_counts(&today(), &mut store);

    Ok(Html(views::banker_page(
        &banker,
        store.transactions(),
        store.users(),
    )))
}
