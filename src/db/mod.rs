use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

pub mod helpers;
mod migrations;
pub mod repositories;

use migrations::run_migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Opens the inputs database and brings its schema up to date.
fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create database directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        warn!("WAL unavailable for {}, using default journal: {err}", path.display());
    }
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set SQLite busy timeout")?;

    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

/// Owns the worker thread. Dropping the job sender ends the thread's loop.
struct Worker {
    jobs: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(mut conn: Connection) -> Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let handle = thread::Builder::new()
            .name("bodyfat-db".into())
            .spawn(move || {
                for job in queue {
                    job(&mut conn);
                }
                info!("Inputs database worker stopped");
            })
            .context("failed to spawn database worker thread")?;

        Ok(Self {
            jobs: Some(jobs),
            handle: Some(handle),
        })
    }

    fn submit(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or_else(|| anyhow!("database worker already shut down"))?
            .send(job)
            .map_err(|_| anyhow!("database worker is no longer running"))
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Inputs database worker panicked");
            }
        }
    }
}

/// Handle to the inputs database. A single connection is owned by a worker
/// thread; queries run one at a time in the order they were submitted.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Opens and migrates on the calling thread, then hands the connection
    /// to the worker.
    pub fn new(path: PathBuf) -> Result<Self> {
        let conn = open_connection(&path)?;
        let worker = Worker::spawn(conn)?;
        info!("Inputs database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(worker),
            path: Arc::new(path),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.worker.submit(Box::new(move |conn| {
            // The caller may have gone away; the task still ran.
            let _ = reply_tx.send(task(conn));
        }))?;

        reply_rx.await.with_context(|| {
            format!("database worker for {} dropped a query", self.path.display())
        })?
    }
}
