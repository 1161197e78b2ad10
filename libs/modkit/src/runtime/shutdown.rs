use anyhow::Result;

/// Resolve when the process receives a termination request (SIGINT/SIGTERM,
/// or the Windows console equivalents).
#[cfg(unix)]
pub async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => tracing::debug!("shutdown: SIGTERM"),
        _ = sigint.recv() => tracing::debug!("shutdown: SIGINT"),
    }
    Ok(())
}

#[cfg(windows)]
pub async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close, ctrl_shutdown};

    let mut c = ctrl_c()?;
    let mut brk = ctrl_break()?;
    let mut close = ctrl_close()?;
    let mut shut = ctrl_shutdown()?;
    tokio::select! {
        _ = c.recv() => {},
        _ = brk.recv() => {},
        _ = close.recv() => {},
        _ = shut.recv() => {},
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
