//! Confidentiality notice shown to client-role users before they may share
//! e.firma files.

use serde::Serialize;
use utoipa::ToSchema;

/// Firm named in the notice when no override is configured.
pub const DEFAULT_FIRM_NAME: &str = "Basteris Reyes y Asociados";

/// Rendered notice plus the two acknowledgements the user must tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsentNotice {
    /// Heading.
    pub title: String,
    /// Markdown body.
    pub body: String,
    /// Label of the first checkbox.
    pub notice_acknowledgement: String,
    /// Label of the second checkbox.
    pub usage_acknowledgement: String,
}

impl ConsentNotice {
    /// Render the notice for `firm` and the user's group.
    ///
    /// # Examples
    /// ```
    /// use satisfacture::domain::ConsentNotice;
    ///
    /// let notice = ConsentNotice::render("Despacho", "Grupo Norte");
    /// assert!(notice.body.contains("**Grupo Norte**"));
    /// ```
    pub fn render(firm: &str, group_name: &str) -> Self {
        let body = format!(
            "**{firm}** informa que los archivos de **e.firma (FIEL)** que usted comparta \
(.cer, .key y contraseña) serán utilizados **exclusivamente** para gestionar descargas de \
CFDI ante el SAT y realizar el análisis fiscal correspondiente al grupo **{group_name}**, \
incluyendo precios de transferencia y cumplimiento de obligaciones fiscales.\n\n\
**Seguridad y resguardo.** Los archivos se resguardan en infraestructura en la nube con \
cifrado en reposo y controles de acceso de mínimo privilegio; el acceso humano está \
protegido con autenticación multifactor. El contenido solo es accesible para personal \
autorizado de {firm} y no se comparte con terceros salvo instrucción expresa o fundamento \
legal aplicable.\n\n\
**Conservación y eliminación.** Se conservan durante la prestación del servicio y los \
plazos necesarios para obligaciones fiscales o contractuales. Puede solicitar su \
eliminación o limitación del tratamiento cuando proceda conforme a la normatividad \
aplicable.\n\n\
Al aceptar, usted **reconoce y consiente** el tratamiento descrito."
        );
        Self {
            title: "Aviso de confidencialidad y consentimiento".to_owned(),
            body,
            notice_acknowledgement: "He leído y acepto el aviso de confidencialidad.".to_owned(),
            usage_acknowledgement: "Soy consciente del uso y alcances de mis archivos de \
e.firma para los fines descritos."
                .to_owned(),
        }
    }
}
