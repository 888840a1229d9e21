//! Invoice PDF rendering and archival
//!
//! Finalized invoices are rendered to an A4 PDF and uploaded to the invoice
//! bucket; the object key is stored back on the invoice.

use chrono::{NaiveDate, Utc};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::external::InvoiceStorage;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP_MARGIN: f32 = 287.0;
const BOTTOM_MARGIN: f32 = 20.0;
const ROW_HEIGHT: f32 = 5.0;

/// Left edge of the Product, Qty, Rate and Total columns
const COLUMNS: [f32; 4] = [10.0, 90.0, 110.0, 140.0];

/// Invoice header fields printed on the document
#[derive(Debug, Clone, FromRow)]
pub struct DocumentHeader {
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_mobile: String,
    pub total_invoice_amount: Decimal,
}

/// One printed invoice line
#[derive(Debug, Clone, FromRow)]
pub struct DocumentLine {
    pub product_name: String,
    pub quantity: i32,
    pub sales_rate: Decimal,
    pub line_total: Decimal,
}

/// Everything needed to render an invoice
#[derive(Debug, Clone)]
pub struct InvoiceDocument {
    pub header: DocumentHeader,
    pub lines: Vec<DocumentLine>,
}

/// Bucket key of an invoice PDF: `invoices/{YYYY-MM-DD}/{invoice_number}.pdf`
pub fn invoice_pdf_key(date: NaiveDate, invoice_number: &str) -> String {
    format!("invoices/{}/{}.pdf", date.format("%Y-%m-%d"), invoice_number)
}

/// Writes text top-down, starting a new page when the current one is full
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl<'a> PageWriter<'a> {
    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
        if self.y < BOTTOM_MARGIN {
            let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_MARGIN;
        }
    }
}

/// Render an invoice to PDF bytes
pub fn render_invoice_pdf(document: &InvoiceDocument) -> AppResult<Vec<u8>> {
    let header = &document.header;
    let title = format!("Invoice {}", header.invoice_number);
    let (doc, page, layer) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Document(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Document(e.to_string()))?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: TOP_MARGIN,
    };

    writer.text("POS Invoice", 16.0, COLUMNS[0], &bold);
    writer.advance(12.0);

    writer.text(&format!("Invoice: {}", header.invoice_number), 11.0, COLUMNS[0], &regular);
    writer.advance(ROW_HEIGHT);
    writer.text(&format!("Customer: {}", header.customer_name), 11.0, COLUMNS[0], &regular);
    writer.advance(ROW_HEIGHT);
    writer.text(&format!("Mobile: {}", header.customer_mobile), 11.0, COLUMNS[0], &regular);
    writer.advance(10.0);

    for (label, x) in ["Product", "Qty", "Rate", "Total"].iter().zip(COLUMNS) {
        writer.text(label, 11.0, x, &bold);
    }
    writer.advance(7.0);

    for line in &document.lines {
        let cells = [
            line.product_name.clone(),
            line.quantity.to_string(),
            format!("{:.2}", line.sales_rate),
            format!("{:.2}", line.line_total),
        ];
        for (cell, x) in cells.iter().zip(COLUMNS) {
            writer.text(cell, 10.0, x, &regular);
        }
        writer.advance(ROW_HEIGHT);
    }

    writer.advance(10.0);
    writer.text(
        &format!("Total: {:.2}", header.total_invoice_amount),
        12.0,
        COLUMNS[0],
        &bold,
    );

    doc.save_to_bytes()
        .map_err(|e| AppError::Document(e.to_string()))
}

/// Loads, renders and uploads invoice documents
#[derive(Clone)]
pub struct InvoiceDocumentService {
    db: PgPool,
    storage: InvoiceStorage,
}

impl InvoiceDocumentService {
    pub fn new(db: PgPool, storage: InvoiceStorage) -> Self {
        Self { db, storage }
    }

    /// Render the invoice, upload it and record its key. Returns the key.
    pub async fn generate_and_upload(&self, invoice_id: i64) -> AppResult<String> {
        if !self.storage.is_enabled() {
            return Err(AppError::Storage("invoice bucket not configured".to_string()));
        }

        let document = self.load(invoice_id).await?;
        let bytes = render_invoice_pdf(&document)?;
        let key = invoice_pdf_key(Utc::now().date_naive(), &document.header.invoice_number);

        self.storage.put_pdf(&key, bytes).await?;

        sqlx::query("UPDATE sales_invoices SET invoice_pdf_key = $1 WHERE id = $2")
            .bind(&key)
            .bind(invoice_id)
            .execute(&self.db)
            .await?;

        Ok(key)
    }

    async fn load(&self, invoice_id: i64) -> AppResult<InvoiceDocument> {
        let header = sqlx::query_as::<_, DocumentHeader>(
            r#"
            SELECT invoice_number, customer_name, customer_mobile, total_invoice_amount
            FROM sales_invoices
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::NotFound("invoice"))?;

        let lines = sqlx::query_as::<_, DocumentLine>(
            r#"
            SELECT p.name AS product_name, sii.quantity, sii.sales_rate, sii.line_total
            FROM sales_invoice_items sii
            JOIN products p ON p.id = sii.product_id
            WHERE sii.sales_invoice_id = $1 AND sii.deleted_at IS NULL
            ORDER BY sii.id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.db)
        .await?;

        Ok(InvoiceDocument { header, lines })
    }
}
