/// End-to-end JSON-RPC sessions over in-memory streams
use chrono::NaiveDate;
use goal_tracker_mcp::mcp::McpServer;
use goal_tracker_mcp::*;
use serde_json::{json, Value};
use tokio::io::BufReader;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tracker_with(goals: &[Goal]) -> GoalTrackerServer {
    let storage = SqliteStorage::in_memory().unwrap();
    for goal in goals {
        storage.create_goal(goal).unwrap();
    }
    GoalTrackerServer::with_storage(storage, TrackerConfig::new("goals.db".into(), 20)).unwrap()
}

fn call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string()
}

/// The JSON payload of a successful tool call
fn tool_data(response: &Value) -> Value {
    let text = response["result"]["content"][1]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

async fn run_session(server: &mut McpServer, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut output = Vec::new();
    server
        .serve(BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect("session failed");

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[cfg(test)]
mod server_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_session() {
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        let mut server = McpServer::new(tracker_with(&[goal.clone()])).unwrap();
        let goal_id = goal.id.to_string();

        let lines = vec![
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            call(2, "goal_toggle", json!({"goal_id": goal_id, "date": "2024-01-02"})),
            call(3, "goal_toggle", json!({"goal_id": goal_id, "date": "2024-01-03"})),
            call(4, "goal_stats", json!({"goal_id": goal_id, "as_of": "2024-01-03"})),
            call(5, "long_term_goal_add", json!({"title": "Save", "type": "annual", "year": 2024})),
            call(6, "backup_export", json!({})),
            call(7, "logs_export_csv", json!({})),
        ];

        let responses = run_session(&mut server, &lines).await;

        // One response per request, none for the notification
        assert_eq!(responses.len(), 7);
        assert!(server.is_initialized());
        let ids: Vec<u64> = responses.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
        for response in &responses {
            assert!(response["error"].is_null(), "unexpected error: {}", response);
        }

        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "Goal Tracker MCP");
        assert_eq!(tool_data(&responses[1])["status"], "done");

        let stats = tool_data(&responses[3]);
        assert_eq!(stats["goal"]["current_streak"], 2);
        assert_eq!(stats["goal"]["total_completed"], 2);

        let backup = tool_data(&responses[5]);
        assert_eq!(backup["goal_count"], 1);

        let csv = tool_data(&responses[6]);
        assert_eq!(csv["row_count"], 2);
        assert!(csv["csv"].as_str().unwrap().contains("2024-01-02,Read,done,1,"));
    }

    #[tokio::test]
    async fn test_backup_round_trip_through_tools() {
        let mut source = McpServer::new(tracker_with(&[])).unwrap();
        let responses = run_session(
            &mut source,
            &[
                call(1, "long_term_goal_add", json!({"title": "Read", "type": "weekly", "year": 2024, "month": 3, "week_number": 12})),
                call(2, "backup_export", json!({})),
            ],
        )
        .await;
        let document = tool_data(&responses[1])["document"].as_str().unwrap().to_string();

        let mut target = McpServer::new(tracker_with(&[])).unwrap();
        let responses = run_session(
            &mut target,
            &[
                call(1, "backup_import", json!({"document": document})),
                call(2, "backup_import", json!({"document": document})),
            ],
        )
        .await;

        assert_eq!(tool_data(&responses[0])["report"]["restored"].as_array().unwrap().len(), 1);
        let second = tool_data(&responses[1]);
        assert_eq!(second["report"]["unchanged"], 1);
        assert!(second["report"]["restored"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_csv_import_updates_toggle_state() {
        let goal = Goal::new("Read".to_string(), None, date(2024, 1, 1)).unwrap();
        let mut server = McpServer::new(tracker_with(&[goal.clone()])).unwrap();
        let csv = "Date,Habit Name,Status,Value,Notes\n2024-01-05,Read,done,1,\n2024-01-06,Unknown,done,1,\n";

        let responses = run_session(
            &mut server,
            &[
                call(1, "logs_import_csv", json!({"csv": csv})),
                // Done from the import, so the next toggle moves to missed
                call(2, "goal_toggle", json!({"goal_id": goal.id.to_string(), "date": "2024-01-05"})),
            ],
        )
        .await;

        let import = tool_data(&responses[0]);
        assert_eq!(import["imported"], 1);
        assert_eq!(import["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(tool_data(&responses[1])["status"], "missed");
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_session() {
        let mut server = McpServer::new(tracker_with(&[])).unwrap();
        let lines = vec![
            "{not json".to_string(),
            call(1, "goal_delete", json!({"goal_id": GoalId::new().to_string()})),
            call(2, "no_such_tool", json!({})),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}).to_string(),
        ];

        let responses = run_session(&mut server, &lines).await;

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[1]["error"]["code"], -32001);
        assert_eq!(responses[2]["error"]["code"], -32602);
        assert!(responses[3]["error"].is_null());
    }
}
