use std::{fs, path::Path, time::SystemTime};

use tracing::{Level, instrument};

use crate::errors::Error;

/// Asegura que la carpeta `path` existe (creándola recursivamente si hace falta).
#[instrument(level = Level::TRACE, err)]
pub fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Verifica que `path` es escribible (tiene permisos adecuados).
#[instrument(level = Level::TRACE, err)]
pub fn check_writable(path: &Path) -> Result<(), Error> {
    let meta = fs::metadata(path)?;
    // en Unix basta con que el owner tenga permisos de escritura:
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = meta.permissions().mode();
        if mode & 0o200 == 0 {
            return Err(Error::ReadOnly(path.to_path_buf()));
        }
    }
    #[cfg(not(unix))]
    {
        if meta.permissions().readonly() || (meta.is_file() && fs::OpenOptions::new().write(true).open(path).is_err()) {
            return Err(Error::ReadOnly(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Fecha de última modificación de `path`, o `None` si no se puede leer.
///
/// Es la marca de "sincronizado en" que devuelven import y export.
#[instrument(level = Level::TRACE)]
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
