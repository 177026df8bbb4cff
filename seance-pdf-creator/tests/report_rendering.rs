use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lopdf::content::Content;
use lopdf::Object;
use seance_pdf_creator::document::page_texts;
use seance_pdf_creator::likert::LikertCell;
use seance_pdf_creator::{Level, Observation, ReportOptions, ReportRenderer};

fn offline_options() -> ReportOptions {
    ReportOptions {
        use_system_fonts: false,
        ..ReportOptions::default()
    }
    .with_assets_dir("/nonexistent/seance-assets")
}

fn session_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn hopping_observation() -> Observation {
    Observation {
        learning_title: "Sauter sur un pied".to_string(),
        domain: "Corps et motricité".to_string(),
        rated_observables: vec![
            "🌱 En train de grandir - Tient l'équilibre ≥ 3 sec".to_string(),
        ],
        ..Observation::default()
    }
}

#[test]
fn single_observation_fills_one_page() {
    let renderer = ReportRenderer::new(offline_options());
    let report = renderer.render(&[hopping_observation()], session_date()).unwrap();

    assert_eq!(report.page_count(), 1);
    let page = &report.pages[0];
    assert!(page.has_header);
    assert_eq!(page.blocks.len(), 1);
    assert_eq!(page.footer, "1/1");

    let block = &page.blocks[0];
    assert_eq!(block.title, "Sauter sur un pied");
    assert_eq!(block.rows.len(), 1);
    let row = &block.rows[0];
    assert_eq!(row.level, Level::Sprout);
    assert_eq!(row.subjects, vec!["Classe".to_string()]);
    assert_eq!(row.label, "Tient l'équilibre ≥ 3 sec");

    let texts = page_texts(&report.bytes).unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].iter().any(|t| t == "1/1"));
    assert!(texts[0].iter().any(|t| t == "Date : 18/10/2026"));
    assert!(texts[0].iter().any(|t| t.contains(">= 3 sec")));
}

#[test]
fn rendering_is_repeatable() {
    let renderer = ReportRenderer::new(offline_options());
    let mut observations = vec![hopping_observation(); 3];
    observations[1].learning_title = "Lancer une balle".to_string();
    observations[2].rated_observables.clear();

    let first = renderer.render(&observations, session_date()).unwrap();
    let second = renderer.render(&observations, session_date()).unwrap();

    assert_eq!(first.page_count(), second.page_count());
    assert_eq!(first.blocks_per_page(), second.blocks_per_page());
    assert!(first.blocks_per_page().iter().all(|&count| count <= 1));
}

#[test]
fn each_observation_gets_its_own_page() {
    let renderer = ReportRenderer::new(offline_options());
    let observations = vec![hopping_observation(); 4];
    let report = renderer.render(&observations, session_date()).unwrap();

    assert_eq!(report.page_count(), 4);
    let document = lopdf::Document::load_mem(&report.bytes).unwrap();
    assert_eq!(document.get_pages().len(), 4);

    let texts = page_texts(&report.bytes).unwrap();
    for (index, page) in texts.iter().enumerate() {
        let footer = format!("{}/4", index + 1);
        assert!(page.contains(&footer), "page {} lacks {}", index + 1, footer);
    }
}

#[test]
fn missing_assets_fall_back_to_digits() {
    let bytes = seance_pdf_creator::render_with_options(
        &[hopping_observation()],
        session_date(),
        &offline_options(),
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let report = ReportRenderer::new(offline_options())
        .render(&[hopping_observation()], session_date())
        .unwrap();
    let cells = &report.pages[0].blocks[0].rows[0].cells;
    assert_eq!(
        cells,
        &vec![LikertCell::Digit('1'), LikertCell::Digit('2'), LikertCell::Digit('3')]
    );
}

#[test]
fn legacy_records_render_with_comments() {
    let json = r#"[{
        "Domaine": "Langage oral",
        "Composante": "Comprendre",
        "Critère": "Écouter une histoire",
        "Activités": ["Lecture", "Marionnettes"],
        "Observables": [
            "Classe: 🌸 Épanoui(e) - Écoute sans interrompre",
            "Léo: 🌰 Petite graine - Répond à une question"
        ],
        "Commentaire": "Très attentifs.\nLéo: a besoin d'aide\nLéo: 🌰 Petite graine - Répond à une question",
        "highlightedSkill": "Collaboration"
    }]"#;
    let observations = Observation::list_from_json(json).unwrap();
    let report = ReportRenderer::new(offline_options())
        .render(&observations, session_date())
        .unwrap();

    assert_eq!(report.page_count(), 1);
    let block = &report.pages[0].blocks[0];
    assert_eq!(block.title, "Écouter une histoire");
    assert_eq!(block.rows.len(), 2);
    assert_eq!(block.rows[1].level, Level::Seed);

    let texts = page_texts(&report.bytes).unwrap().concat();
    assert!(texts.iter().any(|t| t.contains("Léo : a besoin d'aide")));
    assert!(texts.iter().any(|t| t.contains("Compétence : Collaboration")));
}

#[test]
fn empty_input_still_renders_a_page() {
    let bytes =
        seance_pdf_creator::render_with_options(&[], session_date(), &offline_options()).unwrap();
    let texts = page_texts(&bytes).unwrap();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].iter().any(|t| t == "Rapport de la séance"));
}

/// PDF y of every text line start, per page.
fn text_baselines(bytes: &[u8]) -> Vec<Vec<f32>> {
    let document = lopdf::Document::load_mem(bytes).unwrap();
    document
        .get_pages()
        .values()
        .map(|&page_id| {
            let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Td")
                .map(|op| op.operands[1].as_float().unwrap())
                .collect()
        })
        .collect()
}

/// Every text line is either above the footer area or is the footer itself.
fn assert_text_clear_of_footer(bytes: &[u8], options: &ReportOptions) {
    for (index, page) in text_baselines(bytes).iter().enumerate() {
        for &y in page {
            let is_footer = (y - options.footer_offset).abs() < 0.05;
            assert!(
                is_footer || y >= options.footer_safety_margin - 0.05,
                "text at y={} on page {} runs into the footer",
                y,
                index + 1
            );
        }
    }
}

#[test]
fn long_comments_continue_on_following_pages() {
    let mut observation = hopping_observation();
    observation.rated_observables.push("Léo: 🌸 Épanoui(e) - Saute à cloche-pied".to_string());
    let class_lines: Vec<String> = (0..400)
        .map(|i| format!("Remarque numéro {i} sur la participation du groupe."))
        .collect();
    let student_lines: Vec<String> = (0..150)
        .map(|i| format!("Léo: progrès visible à l'essai {i}"))
        .collect();
    observation.comment = format!("{}\n{}", class_lines.join("\n"), student_lines.join("\n"));

    let options = offline_options();
    let report = ReportRenderer::new(options.clone())
        .render(&[observation], session_date())
        .unwrap();

    assert!(report.page_count() > 2);
    assert_eq!(report.blocks_per_page()[0], 1);
    assert!(report.pages[1..].iter().all(|p| p.blocks.len() == 1 && p.blocks[0].continued));
    assert_text_clear_of_footer(&report.bytes, &options);

    let texts = page_texts(&report.bytes).unwrap().concat();
    assert!(texts.iter().any(|t| t.contains("399")));
    assert!(texts.iter().any(|t| t.contains("149")));
}

#[test]
fn very_long_title_is_cut_to_fit_the_page() {
    let mut observation = hopping_observation();
    observation.learning_title = vec!["équilibre"; 600].join(" ");

    let options = offline_options();
    let report = ReportRenderer::new(options.clone())
        .render(&[observation], session_date())
        .unwrap();

    assert_text_clear_of_footer(&report.bytes, &options);
    let texts = page_texts(&report.bytes).unwrap();
    assert!(texts[0].iter().any(|t| t.ends_with('\u{2026}')));
    let rows: usize = report.pages.iter().flat_map(|p| &p.blocks).map(|b| b.rows.len()).sum();
    assert_eq!(rows, 1);
}

fn installed_truetype_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|path| path.is_file())
}

fn is_font_of_subtype(object: &Object, subtype: &[u8]) -> bool {
    match object.as_dict() {
        Ok(dict) => matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == subtype),
        Err(_) => false,
    }
}

#[test]
fn embedded_truetype_font_is_written_as_type0() {
    let Some(font_path) = installed_truetype_font() else {
        eprintln!("no TrueType font installed, skipping");
        return;
    };
    let assets = tempfile::tempdir().unwrap();
    let fonts_dir = assets.path().join("fonts");
    std::fs::create_dir_all(&fonts_dir).unwrap();
    std::fs::copy(&font_path, fonts_dir.join("DejaVuSans.ttf")).unwrap();

    let options = ReportOptions {
        use_system_fonts: false,
        ..ReportOptions::default()
    }
    .with_assets_dir(assets.path());
    let renderer = ReportRenderer::new(options);
    assert!(!renderer.fonts().uses_builtin_fallback());

    let observations = vec![hopping_observation(); 2];
    let report = renderer.render(&observations, session_date()).unwrap();
    assert_eq!(report.page_count(), 2);

    let texts = page_texts(&report.bytes).unwrap();
    assert!(texts[0].iter().any(|t| t == "1/2"));
    assert!(texts[1].iter().any(|t| t == "2/2"));
    assert!(texts[0].iter().any(|t| t == "Date : 18/10/2026"));
    assert!(texts[0].iter().any(|t| t.contains("≥ 3 sec")));

    let document = lopdf::Document::load_mem(&report.bytes).unwrap();
    assert!(document.objects.values().any(|o| is_font_of_subtype(o, b"Type0")));
    let cid_font = document
        .objects
        .values()
        .find(|o| is_font_of_subtype(o, b"CIDFontType2"))
        .and_then(|o| o.as_dict().ok())
        .unwrap();
    let widths = cid_font.get(b"W").and_then(Object::as_array).unwrap();
    assert!(!widths.is_empty());
    assert!(cid_font.get(b"CIDToGIDMap").is_ok());
}

#[test]
fn font_folder_without_fonts_falls_back_to_helvetica() {
    let assets = tempfile::tempdir().unwrap();
    let options = ReportOptions {
        use_system_fonts: false,
        ..ReportOptions::default()
    }
    .with_assets_dir(Path::new(assets.path()));
    assert!(ReportRenderer::new(options).fonts().uses_builtin_fallback());
}
