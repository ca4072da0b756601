use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use uuid::Uuid;

use crate::core::AppConfig;
use crate::core::db::{async_db, setup_db};
use crate::energy::EnergyState;
use crate::ledger::chat::send_turn;
use crate::ledger::format::format_grams;
use crate::orchestrator::OrchestratorClient;

const HELP: &str = "Commands: /eco toggles eco mode, /model <id> pins a model, /auto resets routing, /quit exits";

pub async fn run(config: &AppConfig, chat_id: Option<String>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let db = async_db(&config.db_file()).await?;
    setup_db(&db).await?;
    let client = OrchestratorClient::new(&config.backend_url);
    let mut energy = EnergyState::default();
    let chat_id = chat_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    println!("Chat {} via {}", chat_id, client.base_url());
    println!("{}", HELP);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
                    ("/quit", _) => break,
                    ("/help", _) => println!("{}", HELP),
                    ("/eco", _) => {
                        let on = energy.toggle_eco();
                        println!("Eco mode {}", if on { "on" } else { "off" });
                    }
                    ("/model", model) if !model.is_empty() => {
                        energy.select_model(Some(model.to_string()));
                        println!("Routing manually to {}", model);
                    }
                    ("/auto", _) => {
                        energy.reset();
                        println!("Routing automatically");
                    }
                    _ => {
                        let turn =
                            send_turn(&db, &client, &config.user_id, &chat_id, line, &energy)
                                .await?;
                        println!("{}", turn.assistant.content);
                        let carbon = &turn.assistant.carbon;
                        if turn.live && !turn.deferred {
                            println!(
                                "  [{} in {}, {} saved, {}ms{}]",
                                carbon.model,
                                carbon.region,
                                format_grams(carbon.saved_g),
                                carbon.latency_ms,
                                if carbon.cached { ", cached" } else { "" }
                            );
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
