/*!
 * End-to-end interchange package conversions through the controller
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use cornucopia_convert::app_config::FileType;
use cornucopia_convert::app_controller::{Controller, RunOptions};
use crate::common::{self, Workspace};

const STORY: &str = "Stories/Story_u1.xml";

// Folders left in the output directory, besides output files
fn scratch_dirs(output_dir: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(dirs)
}

/// Test that story contents are translated and the package is rebuilt
#[test]
fn test_convert_idml_toSpanish_shouldTranslateStories() -> Result<()> {
    common::init_logging();
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;

    let output = controller.convert_type_language(FileType::Idml, "es")?;
    assert_eq!(
        output,
        workspace.path().join("output/owasp_cornucopia_webapp_cards_es_1.22.idml")
    );

    let story = common::read_zip_entry(&output, STORY)?;
    assert!(story.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
    assert!(story.contains("<Content>Validación y codificación de datos</Content><Br/>"));
    assert!(story.contains("<Content>Suplantación de la identidad de un usuario de confianza</Content>"));
    assert!(story.contains("<Content>OWASP SCP\u{2028}69, 107-109</Content>"));
    assert!(story.contains("<Content>Instrucciones para jugar</Content>"));
    assert!(!story.contains("${"));

    assert_eq!(
        common::read_zip_entry(&output, "mimetype")?,
        "application/vnd.adobe.indesign-idml-package"
    );
    assert!(scratch_dirs(&workspace.path().join("output"))?.is_empty());
    Ok(())
}

/// Test that the original package becomes a template
#[test]
fn test_convert_idml_makingTemplate_shouldTagStories() -> Result<()> {
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?;

    let output = controller.convert_type_language(FileType::Idml, "template")?;
    assert_eq!(
        output,
        workspace.path().join("output/owasp_cornucopia_webapp_cards_en_1.22_template.idml")
    );

    let story = common::read_zip_entry(&output, STORY)?;
    for tag in common::TEMPLATE_PARAGRAPHS {
        assert!(story.contains(&format!("<Content>{}</Content>", tag)), "missing {}", tag);
    }
    Ok(())
}

/// Test that debug runs keep the extracted package
#[test]
fn test_convert_idml_withDebug_shouldKeepScratchFolder() -> Result<()> {
    let workspace = Workspace::new()?;
    let controller = Controller::with_config(workspace.config())?.with_options(RunOptions {
        debug: true,
        ..RunOptions::default()
    });

    controller.convert_type_language(FileType::Idml, "es")?;
    let dirs = scratch_dirs(&workspace.path().join("output"))?;
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].starts_with("temp"));
    Ok(())
}

/// Test that a broken story fragment is left alone while the rest is converted
#[test]
fn test_convert_idml_withMalformedStory_shouldSkipFragment() -> Result<()> {
    let workspace = Workspace::new()?;
    let input = workspace.path().join("resources/broken.idml");
    let mut zip = zip::ZipWriter::new(fs::File::create(&input)?);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("Stories/Story_a.xml", options)?;
    std::io::Write::write_all(&mut zip, b"<Story><Content>${VE_suit}</Story>")?;
    zip.start_file("Stories/Story_b.xml", options)?;
    std::io::Write::write_all(&mut zip, b"<Story><Content>${VE_suit}</Content></Story>")?;
    zip.finish()?;

    let controller = Controller::with_config(workspace.config())?.with_options(RunOptions {
        input_file: Some("resources/broken.idml".to_string()),
        output_file: Some("output/broken_lang.idml".to_string()),
        debug: false,
    });
    let output = controller.convert_type_language(FileType::Idml, "es")?;
    assert_eq!(output, workspace.path().join("output/broken_es.idml"));

    assert_eq!(
        common::read_zip_entry(&output, "Stories/Story_a.xml")?,
        "<Story><Content>${VE_suit}</Story>"
    );
    assert_eq!(
        common::read_zip_entry(&output, "Stories/Story_b.xml")?,
        "<Story><Content>Validación y codificación de datos</Content></Story>"
    );
    Ok(())
}
