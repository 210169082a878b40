mod common;

use std::fs;
use std::path::Path;

use common::{approx, page_operations, shown_text};
use formstamp::{Catalog, Error, Record, Surface, TemplateDocument, fill_template, render};
use lopdf::Document;
use rayon::prelude::*;

const FORM: (f32, f32) = (666.0, 864.0);

fn sample_catalog() -> Catalog {
    Catalog::builder()
        .text("account_type", 0, 120.0, 520.0, 200.0, 9.0)
        .boxed("pincode", 0, 513.0, 446.0, 15.0, 9.0, 6)
        .checkbox("gender", 0, &[("Male", 423.0, 307.0), ("Female", 484.0, 307.0)])
        .build()
        .unwrap()
}

fn sample_record() -> Record {
    [("account_type", "Savings"), ("pincode", "570001"), ("gender", "Male")]
        .into_iter()
        .collect()
}

fn page_sizes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let mb = doc.get_dictionary(id).unwrap().get(b"MediaBox").unwrap().as_array().unwrap();
            (common::num(&mb[2]), common::num(&mb[3]))
        })
        .collect()
}

#[test]
fn missing_template_is_reported() {
    let err = TemplateDocument::open(Path::new("tests/output/does-not-exist.pdf"))
        .err()
        .expect("open should fail");
    assert!(matches!(err, Error::TemplateNotFound(_)), "{err}");
    assert!(err.is_template_problem());
}

#[test]
fn garbage_bytes_are_a_corrupt_template() {
    let err = TemplateDocument::open_bytes(b"%PDF-1.4 this is not a pdf").err().unwrap();
    assert!(matches!(err, Error::CorruptTemplate(_)), "{err}");
}

#[test]
fn pages_report_their_size() {
    let doc = TemplateDocument::open_bytes(&common::template_bytes(&[FORM, (612.0, 792.0)])).unwrap();
    assert_eq!(doc.page_count(), 2);
    let second = doc.page(1).unwrap();
    assert_eq!((second.width(), second.height()), (612.0, 792.0));

    let err = doc.page(2).err().unwrap();
    assert!(matches!(err, Error::PageOutOfRange { index: 2, count: 2 }));
}

#[test]
fn empty_record_leaves_pages_untouched() {
    let template = common::template_bytes(&[FORM, FORM]);
    let mut doc = TemplateDocument::open_bytes(&template).unwrap();
    let report = render(&mut doc, &Record::new(), &sample_catalog()).unwrap();
    assert!(!doc.is_modified());
    assert_eq!(report.marks_drawn(), 0);

    let out = doc.to_bytes().unwrap();
    assert_eq!(page_sizes(&out), [FORM, FORM]);
    for page in 0..2 {
        assert_eq!(
            format!("{:?}", page_operations(&out, page)),
            format!("{:?}", page_operations(&template, page))
        );
    }
}

#[test]
fn drawn_text_lands_in_pdf_space() {
    let template = common::template_bytes(&[FORM]);
    let mut doc = TemplateDocument::open_bytes(&template).unwrap();
    render(&mut doc, &sample_record(), &sample_catalog()).unwrap();
    let out = doc.to_bytes().unwrap();

    let ops = page_operations(&out, 0);
    let shown = shown_text(&ops, "Fs");
    // One run for the text field, six boxes, one check.
    assert_eq!(shown.len(), 8);

    let text = &shown[0];
    assert_eq!(text.font, "FsHelv");
    assert!(approx(text.x, 120.0) && approx(text.y, 864.0 - 520.0), "{text:?}");
    assert_eq!(text.bytes, b"SAVINGS");

    for (i, cell) in shown[1..7].iter().enumerate() {
        assert!(approx(cell.x, 513.0 + 15.0 * i as f32), "{cell:?}");
        assert!(approx(cell.y, 864.0 - 446.0));
    }

    let check = &shown[7];
    assert_eq!(check.font, "FsZaDb");
    assert_eq!(check.bytes, b"4");
}

#[test]
fn template_content_is_isolated_from_overlay() {
    let template = common::template_bytes(&[FORM]);
    let mut doc = TemplateDocument::open_bytes(&template).unwrap();
    render(&mut doc, &sample_record(), &sample_catalog()).unwrap();
    let out = doc.to_bytes().unwrap();

    let ops = page_operations(&out, 0);
    let names: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
    assert_eq!(names.first(), Some(&"q"));
    assert_eq!(names.last(), Some(&"Q"));
    let saves = names.iter().filter(|n| **n == "q").count();
    let restores = names.iter().filter(|n| **n == "Q").count();
    assert_eq!(saves, restores);

    // The template's own text survives ahead of the overlay.
    let original = shown_text(&ops, "F1");
    assert_eq!(original.len(), 1);
    assert_eq!(original[0].bytes, b"Printed form page 1");
}

#[test]
fn indirect_content_arrays_are_spliced() {
    let template = common::template_with_indirect_contents(&[FORM]);
    let catalog = Catalog::builder()
        .text("account_type", 0, 120.0, 520.0, 200.0, 9.0)
        .build()
        .unwrap();
    let record: Record = [("account_type", "Savings")].into_iter().collect();

    let mut doc = TemplateDocument::open_bytes(&template).unwrap();
    render(&mut doc, &record, &catalog).unwrap();
    let out = doc.to_bytes().unwrap();

    let parsed = Document::load_mem(&out).unwrap();
    let page_id = *parsed.get_pages().values().next().unwrap();
    let contents = parsed.get_dictionary(page_id).unwrap().get(b"Contents").unwrap().as_array().unwrap();
    // Prefix, the template's one stream, overlay.
    assert_eq!(contents.len(), 3);
    for entry in contents {
        let id = entry.as_reference().unwrap();
        assert!(parsed.get_object(id).unwrap().as_stream().is_ok(), "{id:?} is not a stream");
    }

    let ops = page_operations(&out, 0);
    assert_eq!(shown_text(&ops, "F1")[0].bytes, b"Printed form page 1");
    assert_eq!(shown_text(&ops, "FsHelv")[0].bytes, b"SAVINGS");
}

#[test]
fn fonts_are_added_to_page_resources() {
    let mut doc = TemplateDocument::open_bytes(&common::template_bytes(&[FORM])).unwrap();
    render(&mut doc, &sample_record(), &sample_catalog()).unwrap();
    let out = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();

    let page_id = *out.get_pages().values().next().unwrap();
    let resources = out.get_dictionary(page_id).unwrap().get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.has(b"F1"));
    let helv_id = fonts.get(b"FsHelv").unwrap().as_reference().unwrap();
    let helv = out.get_dictionary(helv_id).unwrap();
    assert_eq!(helv.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
    assert_eq!(helv.get(b"Encoding").unwrap().as_name().unwrap(), b"WinAnsiEncoding");
    assert!(fonts.has(b"FsZaDb"));
}

#[test]
fn resource_names_never_collide() {
    let template = common::template_with_font_name(&[FORM], "FsHelv");
    let mut doc = TemplateDocument::open_bytes(&template).unwrap();
    render(&mut doc, &sample_record(), &sample_catalog()).unwrap();
    let out = doc.to_bytes().unwrap();

    let ops = page_operations(&out, 0);
    let ours = shown_text(&ops, "FsHelv_");
    assert_eq!(ours.len(), 7);
    assert!(ours.iter().all(|t| t.font == "FsHelv_1"));
    let theirs: Vec<_> = shown_text(&ops, "FsHelv").into_iter().filter(|t| t.font == "FsHelv").collect();
    assert_eq!(theirs.len(), 1);
}

#[test]
fn images_are_embedded_as_xobjects() {
    let dir = common::output_dir("images_are_embedded");
    let photo = dir.join("photo.png");
    fs::write(&photo, common::png_bytes(20, 30, 128)).unwrap();
    let signature = dir.join("signature.jpg");
    fs::write(&signature, common::jpeg_bytes(40, 10)).unwrap();

    let catalog = Catalog::builder()
        .image("photograph", 0, 490.0, 510.0, 71.0, 90.0)
        .image("signature", 0, 433.0, 712.0, 180.0, 40.0)
        .build()
        .unwrap();
    let record: Record = [
        ("photograph", photo.to_str().unwrap()),
        ("signature", signature.to_str().unwrap()),
    ]
    .into_iter()
    .collect();

    let mut doc = TemplateDocument::open_bytes(&common::template_bytes(&[FORM])).unwrap();
    let report = render(&mut doc, &record, &catalog).unwrap();
    assert_eq!(report.drawn().count(), 2);
    let out = Document::load_mem(&doc.to_bytes().unwrap()).unwrap();

    let page_id = *out.get_pages().values().next().unwrap();
    let resources = out.get_dictionary(page_id).unwrap().get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();

    let png = out.get_object(xobjects.get(b"FsIm1").unwrap().as_reference().unwrap()).unwrap();
    let png = png.as_stream().unwrap();
    assert_eq!(png.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
    assert!(png.dict.has(b"SMask"), "translucent PNG keeps its alpha");

    let jpg = out.get_object(xobjects.get(b"FsIm2").unwrap().as_reference().unwrap()).unwrap();
    let jpg = jpg.as_stream().unwrap();
    assert_eq!(jpg.dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
    assert_eq!(jpg.dict.get(b"Width").unwrap().as_i64().unwrap(), 40);
}

#[test]
fn same_record_gives_identical_bytes() {
    let template = common::template_bytes(&[FORM, FORM]);
    let catalog = sample_catalog();
    let record = sample_record();

    let render_once = || {
        let mut doc = TemplateDocument::open_bytes(&template).unwrap();
        render(&mut doc, &record, &catalog).unwrap();
        doc.to_bytes().unwrap()
    };

    let first = render_once();
    assert_eq!(first, render_once());

    let parallel: Vec<Vec<u8>> = (0..4).into_par_iter().map(|_| render_once()).collect();
    assert!(parallel.iter().all(|bytes| *bytes == first));
}

#[test]
fn fill_template_writes_output_and_leaves_template_alone() {
    let _ = env_logger::try_init();
    let template = common::write_template("fill_template", &[FORM]);
    let before = fs::read(&template).unwrap();
    let output = common::output_dir("fill_template").join("filled.pdf");

    let report = fill_template(&template, &sample_record(), &sample_catalog(), &output).unwrap();

    assert!(report.is_complete());
    assert_eq!(fs::read(&template).unwrap(), before);
    let out = fs::read(&output).unwrap();
    assert_eq!(page_sizes(&out), [FORM]);
    assert_eq!(shown_text(&page_operations(&out, 0), "Fs").len(), 8);
}

#[test]
fn unwritable_output_is_an_output_problem() {
    let template = common::write_template("unwritable_output", &[FORM]);
    let output = Path::new("tests/output/unwritable_output/missing-dir/filled.pdf");

    let err = fill_template(&template, &sample_record(), &sample_catalog(), output)
        .err()
        .unwrap();
    assert!(matches!(err, Error::Write { .. }), "{err}");
    assert!(err.is_output_problem());
}

#[test]
fn serialization_failure_is_an_output_problem() {
    let err = Error::Serialize("xref table overflow".into());
    assert!(err.is_output_problem());
    assert!(!err.is_template_problem());
    assert_eq!(err.to_string(), "cannot serialize output: xref table overflow");
}
