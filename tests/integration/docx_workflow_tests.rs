/*!
 * End-to-end docx and pdf conversions through the controller
 */

use anyhow::Result;
use std::path::Path;
use cornucopia_convert::app_config::FileType;
use cornucopia_convert::app_controller::{Controller, RunOptions};
use cornucopia_convert::documents::DocxDocument;
use crate::common::{self, Workspace};

fn paragraphs(path: &Path) -> Result<Vec<String>> {
    Ok(DocxDocument::open(path)?.paragraph_texts()?)
}

/// Test that a template is filled with the Spanish text and mappings
#[test]
fn test_convert_docx_toSpanish_shouldReplaceEveryTag() -> Result<()> {
    common::init_logging();
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;

    let output = controller.convert_type_language(FileType::Docx, "es")?;
    assert_eq!(
        output,
        workspace.path().join("output/owasp_cornucopia_webapp_cards_es_1.22.docx")
    );
    assert_eq!(
        paragraphs(&output)?,
        vec![
            "Validación y codificación de datos",
            "Suplantación de la identidad de un usuario de confianza",
            "OWASP SCP\u{2028}69, 107-109",
            "Instrucciones para jugar",
        ]
    );
    Ok(())
}

/// Test that the original English document becomes the template
#[test]
fn test_convert_docx_makingTemplate_shouldProduceTags() -> Result<()> {
    common::init_logging();
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;

    let output = controller.convert_type_language(FileType::Docx, "template")?;
    assert_eq!(
        output,
        workspace.path().join("output/owasp_cornucopia_webapp_cards_en_1.22_template.docx")
    );
    assert_eq!(paragraphs(&output)?, common::TEMPLATE_PARAGRAPHS.to_vec());
    Ok(())
}

/// Test that making a template from a template changes nothing
#[test]
fn test_convert_docx_makingTemplateTwice_shouldBeIdempotent() -> Result<()> {
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;
    let first = controller.convert_type_language(FileType::Docx, "template")?;

    let controller = Controller::with_config(workspace.config())?.with_options(RunOptions {
        input_file: Some(first.to_string_lossy().to_string()),
        output_file: Some("output/second_template.docx".to_string()),
        debug: false,
    });
    let second = controller.convert_type_language(FileType::Docx, "template")?;
    assert_eq!(second, workspace.path().join("output/second_template.docx"));
    assert_eq!(paragraphs(&second)?, paragraphs(&first)?);
    Ok(())
}

/// Test that translating the generated template gives back the English text
#[test]
fn test_convert_docx_templateThenEnglish_shouldRestoreOriginal() -> Result<()> {
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;
    let template = controller.convert_type_language(FileType::Docx, "template")?;

    let controller = Controller::with_config(workspace.config())?.with_options(RunOptions {
        input_file: Some(template.to_string_lossy().to_string()),
        ..RunOptions::default()
    });
    let english = controller.convert_type_language(FileType::Docx, "en")?;
    assert_eq!(paragraphs(&english)?, common::ORIGINAL_PARAGRAPHS.to_vec());
    Ok(())
}

/// Test that a missing input document aborts the conversion
#[test]
fn test_convert_docx_withMissingInput_shouldFail() -> Result<()> {
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?.with_options(RunOptions {
        input_file: Some("resources/missing.docx".to_string()),
        ..RunOptions::default()
    });
    assert!(controller.convert_type_language(FileType::Docx, "en").is_err());
    assert!(!workspace.path().join("output").exists());
    Ok(())
}

/// Test that pdf output runs the configured converter on a temporary docx
#[cfg(unix)]
#[test]
fn test_convert_pdf_withCopyConverter_shouldRemoveTemporaryDocx() -> Result<()> {
    let workspace = Workspace::new()?;
    let mut config = workspace.config();
    config.pdf.converter_command = "cp".to_string();
    let controller = Controller::with_config(config)?;

    let output = controller.convert_type_language(FileType::Pdf, "en")?;
    assert_eq!(
        output,
        workspace.path().join("output/owasp_cornucopia_webapp_cards_en_1.22.pdf")
    );
    assert!(output.exists());
    assert!(!workspace.path().join("output/temp.docx").exists());
    Ok(())
}

/// Test that a failing pdf converter leaves the docx behind
#[test]
fn test_convert_pdf_withFailingConverter_shouldKeepDocx() -> Result<()> {
    let workspace = Workspace::new()?;
    let mut config = workspace.config();
    config.pdf.converter_command = "cornucopia-no-such-converter".to_string();
    let controller = Controller::with_config(config)?;

    let output = controller.convert_type_language(FileType::Pdf, "es")?;
    assert_eq!(output, workspace.path().join("output/temp.docx"));
    assert_eq!(paragraphs(&output)?[0], "Validación y codificación de datos");
    Ok(())
}
