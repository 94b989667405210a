mod common;

use common::MesaTest;
use common::stub_server::{Route, StubServer};
use common::{page_json, staff_json, ticket_json};
use serde_json::json;

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let mesa = MesaTest::new();
    let output = mesa.run_success(&["--help"]);
    for command in ["ls", "assign", "bulk-assign", "respond", "phones", "board", "config"] {
        assert!(output.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_ls_without_api_url_fails() {
    let mesa = MesaTest::new();
    let stderr = mesa.run_failure(&["ls"]);
    assert!(stderr.contains("API base URL not configured"));
}

#[test]
fn test_invalid_status_rejected() {
    let mesa = MesaTest::new();
    let stderr = mesa.run_failure(&["ls", "--status", "NUEVO,ABIERTO"]);
    assert!(stderr.contains("ABIERTO"));
}

#[test]
fn test_page_zero_rejected() {
    let mesa = MesaTest::new();
    mesa.run_failure(&["ls", "--page", "0"]);
}

#[test]
fn test_assign_requires_target() {
    let mesa = MesaTest::new();
    mesa.run_failure(&["assign", "7"]);
    mesa.run_failure(&["assign", "7", "--to", "3", "--me"]);
}

#[test]
fn test_respond_rejects_template_with_text() {
    let mesa = MesaTest::new();
    mesa.run_failure(&[
        "respond", "7", "--template", "1", "--text", "hola", "--status", "RESUELTO",
    ]);
}

#[test]
fn test_respond_rejects_closing_status() {
    let mesa = MesaTest::new();
    let stderr = mesa.run_failure(&["respond", "7", "--template", "1", "--status", "CERRADO"]);
    assert!(stderr.contains("EN_PROCESO") || stderr.contains("RESUELTO"));
}

#[test]
fn test_invalid_urgency_rejected() {
    let mesa = MesaTest::new();
    let stderr = mesa.run_failure(&["ls", "--urgency", "purple"]);
    assert!(stderr.contains("purple"));
}

// ============================================================================
// Against a stub API
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_ls_json_with_urgency_refinement() {
    let server = StubServer::start(vec![Route::get(
        "tickets/buscar",
        page_json(
            vec![
                ticket_json(1, "NUEVO", 5, None),
                ticket_json(2, "NUEVO", 30, None),
                ticket_json(3, "EN_PROCESO", 90, Some((3, "Luis Paz"))),
            ],
            2,
            18,
            0,
        ),
    )])
    .await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let value = tokio::task::spawn_blocking(move || {
        mesa.run_json(&["ls", "--urgency", "red", "--size", "3", "--json"])
    })
    .await
    .unwrap();

    let tickets = value["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], json!(3));
    assert_eq!(tickets[0]["urgency"], json!("red"));
    assert_eq!(value["page"], json!(1));
    assert_eq!(value["total_pages"], json!(2));
    assert_eq!(value["total_elements"], json!(18));

    let request = &server.requests_to("GET", "tickets/buscar")[0];
    assert_eq!(request.query_param("size").as_deref(), Some("3"));
    assert_eq!(request.query_param("page").as_deref(), Some("0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ls_text_shows_page_label() {
    let server = StubServer::start(vec![Route::get(
        "tickets/buscar",
        page_json(vec![ticket_json(12, "NUEVO", 5, None)], 4, 46, 1),
    )])
    .await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let stdout = tokio::task::spawn_blocking(move || mesa.run_success(&["ls", "--page", "2"]))
        .await
        .unwrap();
    assert!(stdout.contains("0012-2026"));
    assert!(stdout.contains("Page 2 of 4"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_assign_me_uses_configured_user() {
    let server = StubServer::start(vec![Route::put("tickets/7/asignar", json!({}))]).await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);
    mesa.run_success(&["config", "set", "user.id", "44"]);
    mesa.run_success(&["config", "set", "user.name", "Rosa Huamán"]);

    let value = tokio::task::spawn_blocking(move || {
        mesa.run_json(&["assign", "7", "--me", "--json"])
    })
    .await
    .unwrap();
    assert_eq!(value["staff_id"], json!(44));

    let request = &server.requests_to("PUT", "tickets/7/asignar")[0];
    assert_eq!(
        request.json_body(),
        json!({ "idPersonalAsignado": 44, "nombrePersonalAsignado": "Rosa Huamán" })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_assign_unknown_staff_fails() {
    let server = StubServer::start(vec![Route::get("personal", staff_json())]).await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let stderr = tokio::task::spawn_blocking(move || mesa.run_failure(&["assign", "7", "--to", "99"]))
        .await
        .unwrap();
    assert!(stderr.contains("staff member 99 not found"));
    assert!(server.requests_to("PUT", "tickets/7/asignar").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_message_reported() {
    let server = StubServer::start(vec![Route::new(
        "PUT",
        "tickets/7/desasignar",
        400,
        json!({ "mensaje": "El ticket no tiene personal asignado" }),
    )])
    .await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let stderr = tokio::task::spawn_blocking(move || mesa.run_failure(&["unassign", "7"]))
        .await
        .unwrap();
    assert!(stderr.contains("El ticket no tiene personal asignado"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_staff_lists_open_counts() {
    let server = StubServer::start(vec![
        Route::get("personal", staff_json()),
        Route::get(
            "tickets/all",
            json!([
                ticket_json(1, "EN_PROCESO", 5, Some((3, "Luis Paz"))),
                ticket_json(2, "NUEVO", 5, Some((3, "Luis Paz"))),
            ]),
        ),
    ])
    .await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let value = tokio::task::spawn_blocking(move || mesa.run_json(&["staff", "--json"]))
        .await
        .unwrap();
    let luis = value
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == json!(3))
        .unwrap()
        .clone();
    assert_eq!(luis["open_tickets"], json!(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_board_session_filters_and_quits() {
    let server = StubServer::start(vec![
        Route::get(
            "tickets/buscar",
            page_json(vec![ticket_json(1, "NUEVO", 5, None)], 1, 1, 0),
        ),
        Route::get("tickets/all", json!([])),
        Route::get("personal", staff_json()),
        Route::get("medicos-con-tickets", json!([])),
        Route::get("respuestas-predefinidas", json!([])),
    ])
    .await;
    let mesa = MesaTest::new().with_api_url(&server.base_url);

    let output = tokio::task::spawn_blocking(move || {
        mesa.run_with_stdin(&["board"], "status NUEVO\nbogus\nquit\n")
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("0001-2026"));
    assert!(stderr.contains("unknown command 'bogus'"));

    let searches = server.requests_to("GET", "tickets/buscar");
    assert_eq!(searches.len(), 2);
    assert_eq!(searches[1].query_param("estados").as_deref(), Some("NUEVO"));
}
