use std::{io, path::PathBuf};

/// Errores genéricos del crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No se pudo determinar el directorio base (HOME, XDG, etc)
    #[error(
        "Could not determine the project directory, the call to ProjectDirs failed, \
         the system probably does not provide a valid $HOME path."
    )]
    NoHome,

    /// El destino no existe o no es un fichero regular
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// El destino no tiene carpeta padre donde crear el temporal
    #[error("No parent directory for {0}")]
    NoParent(PathBuf),

    /// El destino no es escribible
    #[error("No write permission for {0}")]
    ReadOnly(PathBuf),

    /// Falló el reemplazo atómico del destino
    #[error("Failed to replace {path} with its temporary copy")]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error de IO al crear dirs, ficheros, temporales...
    #[error(transparent)]
    Io(#[from] io::Error),
}
