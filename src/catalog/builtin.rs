//! Calibrated layout of the bundled account-opening form.
//!
//! Coordinates are top-left origin points, measured against the grid render
//! of the blank template. Boxed rows use the printed 15 pt box pitch.

use super::{Catalog, CatalogBuilder};
use crate::model::DateSlot;

pub const PAGE_WIDTH: f32 = 666.0;
pub const PAGE_HEIGHT: f32 = 864.0;

const PITCH: f32 = 15.0;
const SIZE: f32 = 9.0;

fn slot(x_start: f32, y: f32) -> DateSlot {
    DateSlot {
        x_start,
        y,
        dx: PITCH,
    }
}

pub fn builtin() -> Catalog {
    CatalogBuilder::default()
        // Branch and account details
        .text("account_type", 0, 120.0, 520.0, 200.0, SIZE)
        .text("nominee_name", 0, 120.0, 570.0, 300.0, SIZE)
        .text("nominee_relation", 0, 120.0, 600.0, 150.0, SIZE)
        // Personal details
        .boxed("full_name", 0, 153.0, 252.0, PITCH, SIZE, 30)
        .boxed("branch", 0, 133.0, 131.0, PITCH, SIZE, 23)
        .boxed("code_no", 0, 528.0, 131.0, PITCH, SIZE, 5)
        .boxed("cif_no", 0, 353.0, 154.0, PITCH, SIZE, 20)
        .boxed("father_name", 0, 167.0, 282.0, PITCH, SIZE, 29)
        .boxed("mother_name", 0, 198.0, 350.0, PITCH, SIZE, 25)
        // (B) residential address
        .boxed("residential_address_line1", 0, 227.0, 382.0, PITCH, SIZE, 25)
        .boxed("residential_address_line2", 0, 227.0, 398.0, PITCH, SIZE, 25)
        .boxed("residential_address_line3", 0, 227.0, 414.0, PITCH, SIZE, 25)
        .boxed("residential_landmark", 0, 197.0, 430.0, PITCH, SIZE, 27)
        .boxed("city", 0, 153.0, 446.0, PITCH, SIZE, 18)
        .boxed("pincode", 0, 513.0, 446.0, PITCH, SIZE, 6)
        .boxed("state", 0, 153.0, 462.0, PITCH, SIZE, 30)
        .boxed("phone_no", 0, 183.0, 478.0, PITCH, SIZE, 12)
        .boxed("mobile_number", 0, 453.0, 478.0, PITCH, SIZE, 10)
        .boxed("email_id_1", 0, 167.0, 506.0, PITCH, SIZE, 29)
        .boxed("email_id_2", 0, 167.0, 522.0, PITCH, SIZE, 29)
        // (C) office/business address
        .boxed("office_address_line1", 0, 227.0, 550.0, PITCH, SIZE, 25)
        .boxed("office_address_line2", 0, 227.0, 566.0, PITCH, SIZE, 25)
        .boxed("office_address_line3", 0, 227.0, 582.0, PITCH, SIZE, 25)
        .boxed("office_landmark", 0, 197.0, 598.0, PITCH, SIZE, 27)
        .boxed("office_city", 0, 153.0, 614.0, PITCH, SIZE, 18)
        .boxed("office_state", 0, 153.0, 630.0, PITCH, SIZE, 30)
        .boxed("office_pincode", 0, 198.0, 646.0, PITCH, SIZE, 6)
        .boxed("office_phone_no", 0, 183.0, 662.0, PITCH, SIZE, 16)
        .boxed("office_fax_no", 0, 183.0, 695.0, PITCH, SIZE, 16)
        // (D) income tax and nationality
        .boxed("income_tax_pan_form", 0, 300.0, 755.0, PITCH, SIZE, 10)
        .boxed("nationality", 0, 300.0, 776.0, PITCH, SIZE, 10)
        .date("date", 0, SIZE, slot(152.0, 154.0), slot(194.0, 154.0), slot(236.0, 154.0))
        .date("date_of_birth", 0, SIZE, slot(198.0, 306.0), slot(242.0, 306.0), slot(288.0, 306.0))
        // Photograph box is 2.5 x 3.5 cm on paper; the calibrated height covers the frame.
        .image("photograph", 0, 490.0, 510.0, 71.0, 290.0)
        .image("signature", 0, 433.0, 712.0, 180.0, 40.0)
        .checkbox("gender", 0, &[("Male", 423.0, 307.0), ("Female", 484.0, 307.0)])
        .checkbox(
            "marital_status",
            0,
            &[("Married", 216.0, 332.0), ("Unmarried", 296.0, 332.0), ("Others", 400.0, 332.0)],
        )
        .checkbox("customer_type", 0, &[("Public", 217.0, 211.0), ("Staff", 300.0, 211.0)])
        // B = residential, C = office
        .checkbox("correspondence_address", 0, &[("B", 327.0, 723.0), ("C", 375.0, 723.0)])
        .assemble()
}
