use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{trace, warn};

use crate::guesser::{CoverArtTarget, CoverInfoGuesser};

static CONCURRENT_GUESSING: AtomicBool = AtomicBool::new(true);

/// Hace que `guess_track_cover_info_concurrently` trabaje siempre en el hilo
/// que llama. Afecta a todo el proceso.
pub fn disable_concurrent_guessing_of_track_cover_info_during_tests() {
    CONCURRENT_GUESSING.store(false, Ordering::Relaxed);
}

/// Marca de finalización de una adivinación lanzada en segundo plano. No
/// devuelve nada: el resultado ya se guardó en la pista.
#[derive(Debug)]
#[must_use = "the guess keeps running, but its completion can only be observed through this task"]
pub struct CoverGuessTask(Option<JoinHandle<()>>);

impl CoverGuessTask {
    pub fn is_finished(&self) -> bool {
        self.0.as_ref().is_none_or(JoinHandle::is_finished)
    }

    pub async fn wait(self) {
        if let Some(handle) = self.0 {
            if let Err(e) = handle.await {
                warn!(error = %e, "cover guess task panicked");
            }
        }
    }
}

/// Adivina y asigna la portada de `track` en el pool bloqueante de tokio.
///
/// Cada tarea usa su propio `CoverInfoGuesser`. Sin runtime disponible, o con
/// la ejecución concurrente desactivada, se hace aquí mismo y la tarea vuelve
/// ya terminada.
pub fn guess_track_cover_info_concurrently<T>(track: Arc<T>) -> CoverGuessTask
where
    T: CoverArtTarget + ?Sized + 'static,
{
    let runtime = if CONCURRENT_GUESSING.load(Ordering::Relaxed) {
        Handle::try_current().ok()
    } else {
        None
    };

    match runtime {
        Some(handle) => CoverGuessTask(Some(handle.spawn_blocking(move || {
            CoverInfoGuesser::new().guess_and_set_cover_info_for_track(&*track);
        }))),
        None => {
            trace!("guessing cover synchronously");
            CoverInfoGuesser::new().guess_and_set_cover_info_for_track(&*track);
            CoverGuessTask(None)
        }
    }
}
