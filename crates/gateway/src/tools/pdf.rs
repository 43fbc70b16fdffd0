//! PDF concatenation.
//!
//! Follows the object-renumbering merge approach from the `lopdf`
//! documentation: renumber each source document into a disjoint id range,
//! collect every page object under a single new `Pages` node, and rebuild the
//! catalog. Source documents merge in upload order.

use std::io::Read;

use common::ServiceError;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Merge the given PDF byte streams, in order, into a single document.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] when `inputs` is empty,
/// [`ServiceError::UnprocessableInput`] when any input fails to parse as a
/// PDF or contains no pages.
pub fn merge<R: Read>(inputs: Vec<R>) -> Result<Document, ServiceError> {
    if inputs.is_empty() {
        return Err(ServiceError::BadRequest("no PDF documents supplied".into()));
    }

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: Vec<(ObjectId, Object)> = Vec::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let mut doc = Document::load_from(input).map_err(|e| {
            ServiceError::UnprocessableInput(format!("input {index} is not a valid PDF: {e}"))
        })?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for object_id in doc.get_pages().into_values() {
            let page = doc.get_object(object_id).map_err(|e| {
                ServiceError::UnprocessableInput(format!(
                    "input {index} has a broken page tree: {e}"
                ))
            })?;
            pages.push((object_id, page.to_owned()));
        }
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut page_root: Option<(ObjectId, Dictionary)> = None;

    for (object_id, object) in objects {
        match object.type_name().unwrap_or("") {
            "Catalog" => {
                // Keep the first catalog's id; later catalogs are dropped.
                if catalog.is_none() {
                    if let Ok(dict) = object.as_dict() {
                        catalog = Some((object_id, dict.clone()));
                    }
                }
            }
            "Pages" => {
                // Fold attributes of every source Pages node into one root,
                // first writer wins on conflicting keys.
                if let Ok(dict) = object.as_dict() {
                    match &mut page_root {
                        None => page_root = Some((object_id, dict.clone())),
                        Some((_, root)) => {
                            for (key, value) in dict.iter() {
                                if !root.has(key) {
                                    root.set(key.clone(), value.clone());
                                }
                            }
                        }
                    }
                }
            }
            // Page objects are re-added below with their Parent rewritten;
            // outlines are dropped because their destinations are not
            // remapped across documents.
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let (catalog_id, mut catalog_dict) = catalog.ok_or_else(|| {
        ServiceError::UnprocessableInput("merged inputs contain no document catalog".into())
    })?;
    let (page_root_id, mut page_root_dict) = page_root.ok_or_else(|| {
        ServiceError::UnprocessableInput("merged inputs contain no page tree".into())
    })?;
    if pages.is_empty() {
        return Err(ServiceError::UnprocessableInput(
            "merged inputs contain no pages".into(),
        ));
    }

    page_root_dict.set("Count", pages.len() as i64);
    page_root_dict.set(
        "Kids",
        pages
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    merged
        .objects
        .insert(page_root_id, Object::Dictionary(page_root_dict));

    for (object_id, object) in pages {
        if let Ok(dict) = object.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", page_root_id);
            merged.objects.insert(object_id, Object::Dictionary(dict));
        }
    }

    catalog_dict.set("Pages", page_root_id);
    catalog_dict.remove(b"Outlines");
    merged
        .objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));
    merged.trailer.set("Root", catalog_id);

    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};
    use std::io::Cursor;

    fn one_page_doc(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn merges_two_documents_into_two_pages() {
        let a = one_page_doc("first");
        let b = one_page_doc("second");
        let merged = merge(vec![Cursor::new(a), Cursor::new(b)]).unwrap();
        assert_eq!(merged.get_pages().len(), 2);
    }

    #[test]
    fn merged_output_reparses() {
        let a = one_page_doc("first");
        let b = one_page_doc("second");
        let c = one_page_doc("third");
        let mut merged = merge(vec![Cursor::new(a), Cursor::new(b), Cursor::new(c)]).unwrap();

        let mut bytes = Vec::new();
        merged.save_to(&mut bytes).unwrap();
        let reloaded = Document::load_from(Cursor::new(bytes)).unwrap();
        assert_eq!(reloaded.get_pages().len(), 3);
    }

    #[test]
    fn outlines_are_dropped_and_catalog_rebuilt() {
        let mut doc = Document::load_from(Cursor::new(one_page_doc("with outline"))).unwrap();
        let outlines_id = doc.add_object(dictionary! {
            "Type" => "Outlines",
            "Count" => 0,
        });
        let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        doc.get_object_mut(catalog_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Outlines", outlines_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let merged = merge(vec![Cursor::new(bytes)]).unwrap();
        assert_eq!(merged.get_pages().len(), 1);
        let root = merged.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let catalog = merged.get_object(root).unwrap().as_dict().unwrap();
        assert!(!catalog.has(b"Outlines"));
    }

    #[test]
    fn single_document_passes_through() {
        let a = one_page_doc("only");
        let merged = merge(vec![Cursor::new(a)]).unwrap();
        assert_eq!(merged.get_pages().len(), 1);
    }

    #[test]
    fn empty_input_is_bad_request() {
        let err = merge(Vec::<Cursor<Vec<u8>>>::new()).unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn garbage_input_is_unprocessable() {
        let err = merge(vec![Cursor::new(b"not a pdf".to_vec())]).unwrap_err();
        assert!(matches!(err, ServiceError::UnprocessableInput(_)));
    }
}
