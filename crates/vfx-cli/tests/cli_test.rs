//! Offline tests for the `vfx` subcommand handlers.

use std::path::PathBuf;

use vfx_cli::interpret::{run_interpret, InterpretArgs};
use vfx_cli::render::{run_render, RenderArgs};
use vfx_cli::EXIT_REJECTED;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn reply(status: &str, extra: &str) -> String {
    format!(
        "<env:Envelope xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\"><env:Body>\
         <tikR:RespuestaRegFactuSistemaFacturacion>\
         <tikR:EstadoEnvio>{status}</tikR:EstadoEnvio>\
         <tikR:RespuestaLinea><tikR:IDFactura>\
         <tik:IDEmisorFactura>B12345678</tik:IDEmisorFactura>\
         <tik:NumSerieFactura>2025-A-0001</tik:NumSerieFactura>\
         <tik:FechaExpedicionFactura>01-02-2025</tik:FechaExpedicionFactura>\
         </tikR:IDFactura>\
         <tikR:Operacion><tik:TipoOperacion>Alta</tik:TipoOperacion></tikR:Operacion>\
         <tikR:EstadoRegistro>{status}</tikR:EstadoRegistro>{extra}\
         </tikR:RespuestaLinea>\
         </tikR:RespuestaRegFactuSistemaFacturacion></env:Body></env:Envelope>"
    )
}

#[test]
fn render_writes_first_registration_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("request.xml");
    let code = run_render(&RenderArgs {
        manifest: demo("first-registration.json"),
        out: Some(out.clone()),
    })
    .unwrap();
    assert_eq!(code, 0);

    let xml = std::fs::read_to_string(out).unwrap();
    assert!(xml.contains("<sum1:RegistroAlta>"));
    assert!(xml.contains("<sum1:PrimerRegistro>S</sum1:PrimerRegistro>"));
    assert!(xml.contains("<sum1:ImporteTotal>121.00</sum1:ImporteTotal>"));
    assert!(xml.contains("<sum1:NIF>A87654321</sum1:NIF>"));
}

#[test]
fn render_writes_cancellation_document() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("request.xml");
    run_render(&RenderArgs {
        manifest: demo("cancellation.json"),
        out: Some(out.clone()),
    })
    .unwrap();

    let xml = std::fs::read_to_string(out).unwrap();
    assert!(xml.contains("<sum1:RegistroAnulacion>"));
    assert!(xml.contains("<sum1:NumSerieFacturaAnulada>2025-A-0001</sum1:NumSerieFacturaAnulada>"));
    assert!(!xml.contains("Desglose"));
}

#[test]
fn render_fails_for_cancellation_without_link() {
    let raw = std::fs::read_to_string(demo("cancellation.json")).unwrap();
    let mut manifest: serde_json::Value = serde_json::from_str(&raw).unwrap();
    manifest["events"][0]
        .as_object_mut()
        .unwrap()
        .remove("chain_link");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(&path, manifest.to_string()).unwrap();
    let out = dir.path().join("request.xml");

    let err = run_render(&RenderArgs {
        manifest: path,
        out: Some(out.clone()),
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("chain link"));
    assert!(!out.exists());
}

#[test]
fn interpret_accepted_reply_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reply.xml");
    std::fs::write(&path, reply("Correcto", "")).unwrap();

    let code = run_interpret(&InterpretArgs {
        response: path,
        manifest: Some(demo("first-registration.json")),
    })
    .unwrap();
    assert_eq!(code, 0);
}

#[test]
fn interpret_rejected_reply_exits_with_rejected_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reply.xml");
    let extra = "<tikR:CodigoErrorRegistro>4102</tikR:CodigoErrorRegistro>\
                 <tikR:DescripcionErrorRegistro>Falta Huella</tikR:DescripcionErrorRegistro>";
    std::fs::write(&path, reply("Incorrecto", extra)).unwrap();

    let code = run_interpret(&InterpretArgs {
        response: path,
        manifest: None,
    })
    .unwrap();
    assert_eq!(code, EXIT_REJECTED);
}

#[test]
fn interpret_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reply.xml");
    std::fs::write(&path, "<html>502 Bad Gateway").unwrap();

    assert!(run_interpret(&InterpretArgs {
        response: path,
        manifest: None,
    })
    .is_err());
}
