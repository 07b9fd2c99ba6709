// @generated by l4cdefgen. Do not edit.

/// Registers every catalog message with `ctx`.
pub fn net_init_logdef(ctx: &::l4c::LoggerContext) -> ::std::result::Result<(), ::l4c::Error> {
    ctx.register_message(0, ::l4c::Severity::Info, "NET_UP")?;
    ctx.register_message(1, ::l4c::Severity::Error, "NET_DOWN")?;
    ctx.register_message(2, ::l4c::Severity::Debug, "NET_SCAN")?;
    ctx.register_message(3, ::l4c::Severity::Warning, "DISK_FULL")?;
    Ok(())
}
