use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use ti_services::api::{self, AppState};
use ti_services::client::{ApiClient, ClientError};
use ti_services::config::Config;
use ti_services::db;
use ti_services::models::{ChangePasswordPayload, NewService, NewServiceRequest, RegisterClientPayload};

const PASSWORD: &str = "Abc123!";

/// Starts the API on an ephemeral port over a fresh in-memory database.
async fn spawn_server(require_session: bool) -> Result<String> {
    let config = Config {
        require_session,
        ..Config::in_memory()
    };
    let db = db::init(&config).await?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let app = api::router(AppState::new(db, config));

    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok(format!("http://{address}"))
}

fn registration(login: &str) -> RegisterClientPayload {
    RegisterClientPayload {
        login: Some(login.to_string()),
        password: Some(PASSWORD.to_string()),
        name: Some("Ana Souza".to_string()),
        cpf: Some("123.456.789-09".to_string()),
        birth_date: Some("1990-03-15".to_string()),
        phone: Some("(11) 98765-4321".to_string()),
        marital_status: Some("casado".to_string()),
        education: Some("superior".to_string()),
    }
}

async fn logged_in_client(base_url: &str, login: &str) -> Result<ApiClient> {
    let mut api = ApiClient::new(base_url)?;
    api.register_client(&registration(login)).await?;
    api.login(login, PASSWORD).await?;
    Ok(api)
}

fn request(service_id: i64, order_date: NaiveDate, price: f64) -> NewServiceRequest {
    NewServiceRequest {
        service_id,
        order_date,
        status: "EM ELABORAÇÃO".to_string(),
        charged_price: price,
        expected_date: order_date + chrono::Days::new(3),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn api_error(result: Result<impl std::fmt::Debug, ClientError>) -> (StatusCode, String) {
    match result {
        Err(ClientError::Api { status, message }) => (status, message),
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn root_reports_running() -> Result<()> {
    let base_url = spawn_server(true).await?;

    let body = reqwest::get(&base_url).await?.text().await?;
    assert_eq!(body, "Backend de Serviços de TI rodando");

    Ok(())
}

#[tokio::test]
async fn duplicate_login_is_rejected() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = ApiClient::new(&base_url)?;

    let message = api.register_client(&registration("ana@empresa.com")).await?;
    assert_eq!(message, "Cliente cadastrado com sucesso");

    let (status, message) = api_error(api.register_client(&registration("ana@empresa.com")).await);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Login já existente");

    Ok(())
}

#[tokio::test]
async fn registration_reports_missing_fields_by_name() -> Result<()> {
    let base_url = spawn_server(true).await?;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/clientes"))
        .json(&json!({"login": "ana@empresa.com", "nome": ""}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["message"],
        json!("Campos obrigatórios faltando: senha, nome, cpf, dataNascimento")
    );

    Ok(())
}

#[tokio::test]
async fn registration_rules_enforced_server_side() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = ApiClient::new(&base_url)?;

    let bad_cpf = RegisterClientPayload {
        cpf: Some("111.111.111-11".to_string()),
        ..registration("cpf@empresa.com")
    };
    assert_eq!(api_error(api.register_client(&bad_cpf).await).1, "CPF inválido.");

    let weak = RegisterClientPayload {
        password: Some("abc123".to_string()),
        ..registration("weak@empresa.com")
    };
    let (status, _) = api_error(api.register_client(&weak).await);
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let today = Local::now().date_naive();
    let seventeen = today.with_year(today.year() - 17).unwrap_or(today);
    let minor = RegisterClientPayload {
        birth_date: Some(seventeen.format("%Y-%m-%d").to_string()),
        ..registration("minor@empresa.com")
    };
    assert_eq!(
        api_error(api.register_client(&minor).await).1,
        "Cliente deve ser maior de idade."
    );

    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let mut api = ApiClient::new(&base_url)?;
    api.register_client(&registration("ana@empresa.com")).await?;

    let (status, message) = api_error(api.login("ana@empresa.com", "Xyz789#").await);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "Login ou senha inválidos");
    assert!(api.session().is_none());

    let message = api.login("ana@empresa.com", PASSWORD).await?;
    assert_eq!(message, "Autenticação realizada com sucesso");
    let session = api.session().expect("session stored");
    assert_eq!(session.client.name, "Ana Souza");
    assert_eq!(session.client.login, "ana@empresa.com");

    Ok(())
}

#[tokio::test]
async fn catalog_is_seeded_and_extendable() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = ApiClient::new(&base_url)?;

    let services = api.list_services().await?;
    assert_eq!(services.len(), 4);
    assert_eq!(services[0].name, "Suporte Nível 1");
    assert_eq!(services[0].price, 150.0);
    assert_eq!(services[0].lead_time_days, 2);

    let id = api
        .create_service(&NewService {
            name: "Auditoria de Rede".to_string(),
            description: "Levantamento completo da rede".to_string(),
            price: 980.0,
            lead_time_days: 10,
        })
        .await?;

    let services = api.list_services().await?;
    assert_eq!(services.len(), 5);
    assert!(services.iter().any(|s| s.id == id && s.name == "Auditoria de Rede"));

    Ok(())
}

#[tokio::test]
async fn invalid_service_is_rejected() -> Result<()> {
    let base_url = spawn_server(true).await?;

    let response = reqwest::Client::new()
        .post(format!("{base_url}/servicos"))
        .json(&json!({"nome": "X", "descricao": "Y", "preco": -1, "prazoDias": 3}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], json!("Preço deve ser numérico e maior que zero."));

    Ok(())
}

#[tokio::test]
async fn request_list_round_trip_is_ordered_by_order_date() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = logged_in_client(&base_url, "ana@empresa.com").await?;

    assert!(api.list_requests().await?.is_empty());

    let message = api
        .replace_requests(&[
            request(2, date(2026, 11, 10), 320.0),
            request(1, date(2026, 11, 1), 150.0),
        ])
        .await?;
    assert_eq!(message, "Solicitações atualizadas com sucesso");

    let stored = api.list_requests().await?;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].service_id, 1);
    assert_eq!(stored[0].service_name, "Suporte Nível 1");
    assert_eq!(stored[0].order_date, date(2026, 11, 1));
    assert_eq!(stored[1].service_name, "Backup em Nuvem");
    assert_eq!(stored[1].charged_price, 320.0);

    // A second save replaces, never appends.
    api.replace_requests(&[request(3, date(2026, 12, 1), 890.0)]).await?;
    let stored = api.list_requests().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].service_name, "Monitoramento 24/7");

    api.replace_requests(&[]).await?;
    assert!(api.list_requests().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn malformed_item_leaves_previous_list() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = logged_in_client(&base_url, "ana@empresa.com").await?;
    api.replace_requests(&[request(1, date(2026, 11, 1), 150.0)]).await?;

    let (status, message) = api_error(
        api.replace_requests(&[
            request(2, date(2026, 11, 2), 320.0),
            request(3, date(2026, 11, 3), 0.0),
        ])
        .await,
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Solicitação 2: Preço deve ser numérico e maior que zero.");

    let stored = api.list_requests().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].service_id, 1);

    Ok(())
}

#[tokio::test]
async fn unknown_service_leaves_previous_list() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let api = logged_in_client(&base_url, "ana@empresa.com").await?;
    api.replace_requests(&[request(1, date(2026, 11, 1), 150.0)]).await?;

    let (status, message) = api_error(
        api.replace_requests(&[
            request(2, date(2026, 11, 2), 320.0),
            request(999, date(2026, 11, 3), 10.0),
        ])
        .await,
    );
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, "Erro ao salvar solicitações");

    let stored = api.list_requests().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].service_id, 1);

    Ok(())
}

#[tokio::test]
async fn non_array_body_is_rejected() -> Result<()> {
    let base_url = spawn_server(false).await?;
    let api = ApiClient::new(&base_url)?;
    api.register_client(&registration("ana@empresa.com")).await?;

    let response = reqwest::Client::new()
        .put(format!("{base_url}/solicitacoes/ana@empresa.com"))
        .json(&json!({"solicitacoes": "tudo"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], json!("Lista de solicitações inválida"));

    Ok(())
}

#[tokio::test]
async fn unknown_client_is_not_found() -> Result<()> {
    let base_url = spawn_server(true).await?;

    let response = reqwest::get(format!("{base_url}/solicitacoes/ninguem@empresa.com")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"success": false, "message": "Cliente não encontrado"}));

    Ok(())
}

#[tokio::test]
async fn request_routes_require_the_owners_session() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let _ana = logged_in_client(&base_url, "ana@empresa.com").await?;
    let bruno = logged_in_client(&base_url, "bruno@empresa.com").await?;
    let bruno_token = bruno.session().expect("logged in").token.clone();
    let http = reqwest::Client::new();
    let url = format!("{base_url}/solicitacoes/ana@empresa.com");

    let anonymous = http.get(&url).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body: Value = anonymous.json().await?;
    assert_eq!(body["message"], json!("Sessão inválida ou expirada"));

    let foreign = http.get(&url).bearer_auth(&bruno_token).send().await?;
    assert_eq!(foreign.status(), StatusCode::UNAUTHORIZED);

    let foreign_write = http
        .put(&url)
        .bearer_auth(&bruno_token)
        .json(&json!({"solicitacoes": []}))
        .send()
        .await?;
    assert_eq!(foreign_write.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn sessions_can_be_disabled() -> Result<()> {
    let base_url = spawn_server(false).await?;
    let api = ApiClient::new(&base_url)?;
    api.register_client(&registration("ana@empresa.com")).await?;

    let response = reqwest::get(format!("{base_url}/solicitacoes/ana@empresa.com")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"success": true, "solicitacoes": []}));

    Ok(())
}

#[tokio::test]
async fn logout_revokes_token() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let mut api = logged_in_client(&base_url, "ana@empresa.com").await?;
    let token = api.session().expect("logged in").token.clone();

    api.logout().await?;
    assert!(api.session().is_none());
    assert!(matches!(api.list_requests().await, Err(ClientError::NotLoggedIn)));

    let response = reqwest::Client::new()
        .get(format!("{base_url}/solicitacoes/ana@empresa.com"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn password_change_replaces_credentials_and_sessions() -> Result<()> {
    let base_url = spawn_server(true).await?;
    let old_session = logged_in_client(&base_url, "ana@empresa.com").await?;
    let mut api = ApiClient::new(&base_url)?;

    let wrong = ChangePasswordPayload {
        login: Some("ana@empresa.com".to_string()),
        current_password: Some("Errada1!".to_string()),
        new_password: Some("Xyz789#".to_string()),
    };
    let (status, message) = api_error(api.change_password(&wrong).await);
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(message, "Autenticação inválida");

    let change = ChangePasswordPayload {
        current_password: Some(PASSWORD.to_string()),
        ..wrong
    };
    assert_eq!(api.change_password(&change).await?, "Senha atualizada com sucesso");

    let (status, _) = api_error(old_session.list_requests().await);
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = api_error(api.login("ana@empresa.com", PASSWORD).await);
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    api.login("ana@empresa.com", "Xyz789#").await?;
    assert!(api.list_requests().await?.is_empty());

    Ok(())
}
