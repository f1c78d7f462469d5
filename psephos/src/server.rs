//! The connection server.
//!
//! One producer task per accepted connection reads and decodes a single
//! framed request and turns it into a consumer task. The consumer task
//! owns the socket from then on: it computes the requested primitive —
//! fanned out across workers for ballot generation — and the last worker
//! writes the framed response. On any failure the connection closes with
//! no reply. The task's `Drop` half-closes and closes the socket.

use std::net::Shutdown;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use socket2::Socket;
use tracing::{debug, info, warn};

use psephos_core::model::BallotData;
use psephos_core::{ballot, combine, keygen, sigma, verify};
use psephos_wire::{frame, Request, Response};

use crate::config::ServerConfig;
use crate::endpoint::Endpoint;
use crate::error::ServerError;
use crate::pool::{worker_share, ConsumeTask, ProduceTask, TaskError, ThreadPool};

/// Accepts connections and feeds the pool until the stop flag latches.
pub struct Server {
    listener: Socket,
    pool: Arc<ThreadPool>,
    stop: Arc<AtomicBool>,
    config: ServerConfig,
}

impl Server {
    /// Bind the endpoint and prepare the accept loop. The listener
    /// carries a short accept timeout so a latched `stop` flag is
    /// observed within one retry interval.
    pub fn bind(
        endpoint: &Endpoint,
        pool: Arc<ThreadPool>,
        stop: Arc<AtomicBool>,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        let listener = endpoint.bind(config.backlog)?;
        listener.set_read_timeout(Some(config.accept_retry))?;
        info!(%endpoint, workers = pool.size(), "listening");
        Ok(Server { listener, pool, stop, config })
    }

    /// Run the accept loop until the stop flag latches.
    pub fn serve(&self) -> Result<(), ServerError> {
        while !self.stop.load(Ordering::SeqCst) {
            let socket = match self.listener.accept() {
                Ok((socket, _peer)) => socket,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock
                            | std::io::ErrorKind::TimedOut
                            | std::io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => {
                    debug!(error = %e, "accept failed");
                    continue;
                }
            };
            let _ = socket.set_read_timeout(Some(self.config.io_timeout));
            let _ = socket.set_write_timeout(Some(self.config.io_timeout));
            self.pool.add_task(Box::new(ProducerTask {
                socket,
                timeout: self.config.io_timeout,
                max_parallel: self.config.max_parallel,
            }))?;
        }
        info!("accept loop stopped");
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.listener.shutdown(Shutdown::Both);
    }
}

/// Reads and decodes one framed request off a fresh connection.
struct ProducerTask {
    socket: Socket,
    timeout: Duration,
    max_parallel: usize,
}

impl ProduceTask for ProducerTask {
    fn produce(self: Box<Self>, pool_size: usize) -> Result<Arc<dyn ConsumeTask>, TaskError> {
        let Self { socket, timeout, max_parallel } = *self;
        match read_request(&socket, timeout, max_parallel, pool_size) {
            Ok((request, data_len, total_workers)) => Ok(Arc::new(ConsumerTask {
                socket,
                request,
                data_len,
                total_workers,
                timeout,
                state: Mutex::new(TaskState {
                    remaining: total_workers,
                    ballots: Vec::new(),
                    blanks: Vec::new(),
                }),
            })),
            Err(e) => {
                let _ = socket.shutdown(Shutdown::Both);
                Err(e.into())
            }
        }
    }
}

fn read_request(
    socket: &Socket,
    timeout: Duration,
    max_parallel: usize,
    pool_size: usize,
) -> Result<(Request, usize, usize), ServerError> {
    let mut stream = socket;
    let payload = frame::read_frame(&mut stream, timeout)?;
    let request = Request::from_bytes(payload)?;

    // Only ballot generation fans out; everything else is one worker.
    let (data_len, total_workers) = match &request {
        Request::GenBallot(data) => {
            let number = data.number as usize;
            if number < 1 || number > max_parallel {
                return Err(ServerError::BallotCountRange(data.number));
            }
            (number, number.min(pool_size))
        }
        _ => (1, 1),
    };
    Ok((request, data_len, total_workers))
}

struct TaskState {
    remaining: usize,
    ballots: Vec<psephos_core::model::Ballot>,
    blanks: Vec<psephos_core::model::Ballot>,
}

/// Executes one decoded request; owns the connection until it is dropped.
struct ConsumerTask {
    socket: Socket,
    request: Request,
    data_len: usize,
    total_workers: usize,
    timeout: Duration,
    state: Mutex<TaskState>,
}

impl ConsumeTask for ConsumerTask {
    fn total_workers(&self) -> usize {
        self.total_workers
    }

    fn consume(&self, curr_worker: usize, total_workers: usize) {
        let response = match self.execute(curr_worker, total_workers) {
            Ok(Some(response)) => response,
            Ok(None) => return,
            Err(e) => {
                warn!(tag = self.request.tag(), error = %e, "command failed, closing connection");
                return;
            }
        };
        let payload = response.to_bytes();
        let mut stream = &self.socket;
        if let Err(e) = frame::write_frame(&mut stream, &payload, self.timeout) {
            debug!(error = %e, "failed to send response");
        }
    }
}

impl ConsumerTask {
    /// Compute this worker's part. Returns `Some` only on the worker that
    /// must send the response.
    fn execute(
        &self,
        curr_worker: usize,
        total_workers: usize,
    ) -> Result<Option<Response>, ServerError> {
        match &self.request {
            Request::KeyGen(data) => Ok(Some(Response::Key(keygen::keygen(data)))),
            Request::GenBallot(data) => {
                let share = worker_share(self.data_len, curr_worker, total_workers) as u32;
                let blank_share =
                    worker_share(data.blanks as usize, curr_worker, total_workers) as u32;
                let ballots = ballot::gen_ballots(data, share)?;
                let blanks = ballot::gen_blanks(data, blank_share)?;

                let mut state = self.state.lock();
                state.ballots.extend(ballots);
                state.blanks.extend(blanks);
                state.remaining -= 1;
                if state.remaining == 0 {
                    let data = BallotData {
                        ballots: std::mem::take(&mut state.ballots),
                        blanks: std::mem::take(&mut state.blanks),
                    };
                    Ok(Some(Response::Ballots(data)))
                } else {
                    Ok(None)
                }
            }
            Request::AddCom(data) => Ok(Some(Response::Combined(combine::add_coms(data)?))),
            Request::AddDecom(data) => {
                Ok(Some(Response::CombinedDecom(combine::add_decoms(data)?)))
            }
            Request::CompleteZk(data) => Ok(Some(Response::ZkSet(sigma::complete(data)?))),
            Request::VerifyCom(data) => Ok(Some(Response::Check(verify::verify_com(data)))),
        }
    }
}

impl Drop for ConsumerTask {
    fn drop(&mut self) {
        let _ = self.socket.shutdown(Shutdown::Both);
    }
}
