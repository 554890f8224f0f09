//! HTTP front end. Each handler locks the shared [`Store`] for the whole request, so a
//! mutation and the file rewrite that follows it never interleave with another request.

mod error;
mod handlers;
mod views;

use crate::config::Config;
use crate::features::Store;
use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub type SharedStore = Arc<Mutex<Store>>;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/user-login",
            get(handlers::user_login_form).post(handlers::user_login),
        )
        .route(
            "/banker-login",
            get(handlers::banker_login_form).post(handlers::banker_login),
        )
        .route(
            "/user-page/:blockchain_id",
            get(handlers::user_page).post(handlers::transfer),
        )
        .route("/banker-page/:blockchain_id", get(handlers::banker_page))
        .with_state(store)
}

pub async fn serve(config: &Config, store: Store) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Unable to listen on {}", config.listen))?;
    info!(
        "Listening on http://{} with {} bankers on file in {}",
        listener.local_addr()?,
        store.bankers().len(),
        store.data_dir().display()
    );

    axum::serve(listener, router(Arc::new(Mutex::new(store))))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server stopped unexpectedly")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{today, BlockchainId, Transaction, User};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use crate::test_util::scratch_dir;
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    fn fresh_store() -> SharedStore {
        Arc::new(Mutex::new(Store::open(scratch_dir("http")).unwrap()))
    }

    async fn get(store: &SharedStore, uri: &str) -> Response {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        router(store.clone()).oneshot(request).await.unwrap()
    }

    async fn post(store: &SharedStore, uri: &str, form: &str) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        router(store.clone()).oneshot(request).await.unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn user_form(name: &str, email: &str) -> String {
        format!(
            "name={name}&email={email}&age=30&address=1+Road&account=001&branch=Central"
        )
    }

    fn banker_form(name: &str, email: &str) -> String {
        format!(
            "name={name}&email={email}&age=45&address=2+Road&account=900&branch=Central\
             &resignation=no"
        )
    }

    #[tokio::test]
    async fn static_pages_render() {
        let store = fresh_store();
        for uri in ["/", "/user-login", "/banker-login"] {
            let response = get(&store, uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(text(response).await.contains("<html>"));
        }
    }

    #[tokio::test]
    async fn unknown_pages_are_not_found() {
        let store = fresh_store();

        let response = get(&store, "/user-page/UNKNOWN").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(response).await, "User not found!");

        let response = get(&store, "/banker-page/UNKNOWN").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(response).await, "Banker not found!");

        let response = post(&store, "/user-page/UNKNOWN", "receiver_id=X&amount=1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(store.lock().await.transactions().is_empty());
    }

    #[tokio::test]
    async fn user_registration_redirects_to_generated_id() {
        let store = fresh_store();
        let expected = BlockchainId::generate("Al", "al@x.com");

        let response = post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/user-page/{}", expected));

        let again = post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        assert_eq!(location(&again), format!("/user-page/{}", expected));
        assert_eq!(store.lock().await.users().len(), 1);

        let page = get(&store, &format!("/user-page/{}", expected)).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(text(page).await.contains(expected.as_str()));
    }

    #[tokio::test]
    async fn user_may_bring_an_existing_id() {
        let store = fresh_store();
        let form = format!(
            "{}&blockchain_option=yes&blockchain_id=MYID42",
            user_form("Al", "a")
        );

        let response = post(&store, "/user-login", &form).await;
        assert_eq!(location(&response), "/user-page/MYID42");

        let form = format!("{}&blockchain_option=yes", user_form("Al", "a"));
        let response = post(&store, "/user-login", &form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.lock().await.users().len(), 1);
    }

    #[tokio::test]
    async fn missing_form_field_is_rejected() {
        let store = fresh_store();
        let response = post(&store, "/user-login", "name=Al&email=al%40x.com").await;
        assert!(response.status().is_client_error());
        assert!(store.lock().await.users().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_amount_is_rejected() {
        let store = fresh_store();
        let response = post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        let page = location(&response).to_owned();

        let response = post(&store, &page, "receiver_id=X&amount=lots").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.lock().await.transactions().is_empty());
    }

    #[tokio::test]
    async fn register_transfer_and_inspect_as_banker() {
        let store = fresh_store();

        let response = post(&store, "/banker-login", &banker_form("Bo", "bo%40y.com")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let banker_id = BlockchainId::generate("Bo", "bo@y.com");
        assert_eq!(location(&response), format!("/banker-page/{}", banker_id));

        let al = BlockchainId::generate("Al", "al@x.com");
        assert!(al.as_str().starts_with("ALAL"));
        assert_eq!(al.as_str().len(), 10);
        post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        let cy = BlockchainId::generate("Cy", "cy@z.com");
        post(&store, "/user-login", &user_form("Cy", "cy%40z.com")).await;

        {
            let store = store.lock().await;
            assert_eq!(store.bankers()[0].users, vec![al.clone(), cy.clone()]);
        }

        let response = post(
            &store,
            &format!("/user-page/{}", al),
            &format!("receiver_id={}&amount=50", cy),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), format!("/user-page/{}", al));

        {
            let store = store.lock().await;
            let last: &Transaction = store.transactions().last().unwrap();
            assert_eq!(last.sender_id, al);
            assert_eq!(last.receiver_id, cy);
            assert_eq!(last.amount, dec!(50));
            for id in [&al, &cy] {
                let user = User::find_by_id(id, &store).unwrap();
                assert_eq!(user.transactions.last(), Some(last));
            }
        }

        let response = get(&store, &format!("/banker-page/{}", banker_id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = text(response).await;
        assert!(page.contains(al.as_str()));
        assert!(page.contains(cy.as_str()));

        let store = store.lock().await;
        let sender = User::find_by_id(&al, &store).unwrap();
        assert!(sender.transactions_count >= 1);
        assert_eq!(store.transactions()[0].day(), today());
    }

    #[tokio::test]
    async fn banker_page_shows_todays_count_per_user() {
        let store = fresh_store();
        let response = post(&store, "/banker-login", &banker_form("Bo", "bo%40y.com")).await;
        let banker_page = location(&response).to_owned();
        let al = BlockchainId::generate("Al", "al@x.com");
        post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;

        for amount in ["1", "2.5"] {
            let form = format!("receiver_id=ELSEWHERE&amount={}", amount);
            post(&store, &format!("/user-page/{}", al), &form).await;
        }

        let response = get(&store, &banker_page).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = text(response).await;
        let row = format!("<td>Al</td><td>{}</td><td>001</td><td>2</td>", al);
        assert!(html.contains(&row), "{html}");
        assert!(html.contains("<h1>Bo</h1>"));
    }

    #[tokio::test]
    async fn out_of_range_amount_is_rejected() {
        let store = fresh_store();
        let response = post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        let page = location(&response).to_owned();

        let response = post(&store, &page, "receiver_id=X&amount=1e30").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.lock().await.transactions().is_empty());
    }

    #[tokio::test]
    async fn transfer_is_written_with_a_numeric_amount() {
        let store = fresh_store();
        let response = post(&store, "/user-login", &user_form("Al", "al%40x.com")).await;
        let page = location(&response).to_owned();
        post(&store, &page, "receiver_id=X&amount=50").await;

        let dir = store.lock().await.data_dir().to_owned();
        let raw = std::fs::read_to_string(dir.join("transactions.json")).unwrap();
        assert!(raw.contains("\"amount\": 50.0"), "{raw}");

        let reopened = Store::open(&dir).unwrap();
        assert_eq!(reopened.transactions()[0].amount, dec!(50));
    }

    #[tokio::test]
    async fn user_text_is_escaped_on_the_page() {
        let store = fresh_store();
        let form = user_form("%3Cscript%3E", "x%40y.com");
        let response = post(&store, "/user-login", &form).await;
        let page = location(&response).to_owned();

        let html = text(get(&store, &page).await).await;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
