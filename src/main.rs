use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use memory_workset::analysis::format_signed_hex;
use memory_workset::config::{load_config, validate_config, Config};
use memory_workset::workset::{AddressRegistry, WorksetActor, WorksetEvent, WorksetHandle};
use memory_workset::{
    Address, AddressEntry, FileStore, MemoryRangeTag, SearchHistoryStore, ValueType, Workset,
    WorksetError,
};

const HELP: &str = "\
commands:
  add <addr> <type> [range] [name...]   save an address
  load <type> <addr>...                 replace the working set
  del <addr>                            delete an address
  name <addr> <name...>                 rename an address
  freeze <addr> on|off                  toggle continuous write-back
  sel <addr> | unsel <addr>             change one selection
  all | none | invert                   bulk selection
  list                                  show the working set
  offsets                               analyze the selected addresses
  search <type> <expr...>               record a search expression
  history | forget <type> <expr...> | clear-history
  attach <pid> | detach                 refresh values from a live process
  quit";

/// Running value refresher and its stop signal
struct Refresh {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Refresh {
    async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("loading workset.toml")?;
    validate_config(&config)?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting memory-workset v{}", env!("CARGO_PKG_VERSION"));

    let history = SearchHistoryStore::new(FileStore::new(&config.history.store_path))
        .key(config.history.store_key.clone())
        .capacity(config.history.capacity);

    let mut workset = Workset::with_registry(AddressRegistry::with_parallel_sort_threshold(
        config.workset.parallel_sort_threshold,
    ));
    workset.subscribe(|event: &WorksetEvent| debug!(?event, "workset changed"));
    let (owner, handle) = WorksetActor::spawn(workset, config.workset.command_queue_depth);

    println!("{}", HELP);
    let mut refresh: Option<Refresh> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first().copied() {
            None => continue,
            Some("quit") | Some("exit") => break,
            Some(_) => {
                if let Err(e) = run_command(&words, &handle, &history, &config, &mut refresh).await {
                    println!("error: {}", e);
                }
            }
        }
    }

    if let Some(refresh) = refresh.take() {
        refresh.stop().await;
    }
    drop(handle);
    let workset = owner.await?;
    info!(entries = workset.registry().len(), "Shutting down memory-workset");
    Ok(())
}

async fn run_command(
    words: &[&str],
    handle: &WorksetHandle,
    history: &SearchHistoryStore<FileStore>,
    config: &Config,
    refresh: &mut Option<Refresh>,
) -> Result<()> {
    match words {
        ["add", addr, ty, rest @ ..] => {
            let range = rest
                .first()
                .map(|code| MemoryRangeTag::new(*code, 0xFF2196F3))
                .unwrap_or_else(MemoryRangeTag::unknown);
            let name = rest.get(1..).map(|n| n.join(" ")).unwrap_or_default();
            let entry = AddressEntry::new(Address::parse(addr)?, ty.parse()?, range).with_name(name);
            match handle.insert(entry).await {
                Err(WorksetError::DuplicateAddress(a)) => {
                    println!("{} is already saved; rename or delete it instead", a)
                }
                other => other?,
            }
        }
        ["load", ty, addrs @ ..] => {
            let value_type: ValueType = ty.parse()?;
            let entries = addrs
                .iter()
                .map(|a| {
                    Address::parse(a)
                        .map(|a| AddressEntry::new(a, value_type, MemoryRangeTag::unknown()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            handle.replace_all(entries).await?;
        }
        ["del", addr] => handle.delete(Address::parse(addr)?).await?,
        ["name", addr, name @ ..] => handle.rename(Address::parse(addr)?, name.join(" ")).await?,
        ["freeze", addr, state] => {
            handle
                .set_frozen(Address::parse(addr)?, matches!(*state, "on" | "true" | "1"))
                .await?
        }
        ["sel", addr] => handle.toggle(Address::parse(addr)?, true).await?,
        ["unsel", addr] => handle.toggle(Address::parse(addr)?, false).await?,
        ["all"] => handle.select_all().await?,
        ["none"] => handle.deselect_all().await?,
        ["invert"] => handle.invert_selection().await?,
        ["list"] => {
            let snapshot = handle.snapshot().await?;
            for entry in &snapshot.entries {
                let mark = if snapshot.selected.contains(&entry.address) { '*' } else { ' ' };
                let frozen = if entry.is_frozen { " [frozen]" } else { "" };
                println!(
                    "{} {} {:>6} {:>3} {} {}{}",
                    mark,
                    entry.address,
                    entry.value_type,
                    entry.range.code,
                    entry.display_name(),
                    entry.current_value,
                    frozen
                );
            }
            println!("{} entries, {} selected", snapshot.entries.len(), snapshot.selected.len());
        }
        ["offsets"] => {
            let analysis = handle.analyze_selection().await?;
            if analysis.is_empty() {
                println!("nothing selected");
                return Ok(());
            }
            println!("base {}", analysis.base);
            for e in &analysis.entries {
                let delta = e.delta.map(format_signed_hex).unwrap_or_default();
                println!("  {} {:>3} {:>12} {:>12}", e.address, e.range_label, format_signed_hex(e.offset), delta);
            }
            println!("xor {}", format_signed_hex(analysis.xor_signature));
        }
        ["search", ty, expr @ ..] => history.add(&expr.join(" "), ty.parse()?),
        ["history"] => {
            for item in history.get_all() {
                println!("{} {} ({})", item.value_type.code(), item.expression, item.timestamp);
            }
        }
        ["forget", ty, expr @ ..] => history.delete(&expr.join(" "), ty.parse()?),
        ["clear-history"] => history.clear(),
        ["attach", pid] => {
            if let Some(previous) = refresh.take() {
                previous.stop().await;
            }
            *refresh = Some(attach(pid.parse()?, handle, config)?);
        }
        ["detach"] => match refresh.take() {
            Some(previous) => previous.stop().await,
            None => println!("not attached"),
        },
        ["config"] => println!("{}", toml::to_string_pretty(config)?),
        _ => println!("{}", HELP),
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn attach(pid: u32, handle: &WorksetHandle, config: &Config) -> Result<Refresh> {
    use memory_workset::workset::{ProcMemory, ValueRefresher};

    let memory = ProcMemory::open(pid)?;
    let refresher = ValueRefresher::new(memory, handle.clone(), config.workset.refresh_interval());
    let (stop, shutdown) = watch::channel(false);
    let task = tokio::spawn(refresher.run(shutdown));
    println!("refreshing values from pid {}", pid);
    Ok(Refresh { stop, task })
}

#[cfg(not(target_os = "linux"))]
fn attach(_pid: u32, _handle: &WorksetHandle, _config: &Config) -> Result<Refresh> {
    anyhow::bail!("live process access is only available on linux")
}
